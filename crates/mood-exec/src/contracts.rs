use mood_core::error::ServiceError;
use mood_core::insight::InsightPrompt;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightPayload {
    pub messages: Vec<ChatMessage>,
}

impl From<&InsightPrompt> for InsightPayload {
    fn from(prompt: &InsightPrompt) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: prompt.user.clone(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightResponse {
    #[serde(default)]
    pub completion: Option<String>,
}

/// Pulls the `completion` string out of a response body.
pub fn parse_completion(body: &str) -> Result<String, ServiceError> {
    let response: InsightResponse =
        serde_json::from_str(body).map_err(|err| ServiceError::Malformed(err.to_string()))?;
    match response.completion {
        None => Err(ServiceError::MissingCompletion),
        Some(text) if text.trim().is_empty() => Err(ServiceError::EmptyCompletion),
        Some(text) => Ok(text),
    }
}
