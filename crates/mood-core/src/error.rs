use thiserror::Error;

/// A precondition on user input was not met. Nothing was sent or stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("insufficient content: {words} of {required} words")]
    InsufficientContent { words: usize, required: usize },
    #[error("no mood selected")]
    NoMoodSelected,
}

impl ValidationError {
    /// Toast text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientContent { required, .. } => {
                format!("Please write at least {required} words about how you feel")
            }
            Self::NoMoodSelected => "Please select a mood".to_string(),
        }
    }
}

/// The insight service failed or answered with something unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("insight service returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("response has no completion field")]
    MissingCompletion,
    #[error("completion was empty")]
    EmptyCompletion,
    #[error("request timed out")]
    TimedOut,
}

impl ServiceError {
    pub const USER_MESSAGE: &'static str = "Unable to generate insights right now";

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::TimedOut => true,
            Self::Status(code) => *code >= 500,
            Self::Malformed(_) | Self::MissingCompletion | Self::EmptyCompletion => false,
        }
    }
}

/// What happened to an insight result when it reached the state container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Applied,
    StaleResultDiscarded,
}
