use mood_core::error::ServiceError;
use mood_core::insight::InsightPrompt;
use mood_core::state::Mood;

/// Something that can turn a composed prompt into a short supportive insight.
pub trait InsightService: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate_insight(&self, prompt: &InsightPrompt) -> Result<String, ServiceError>;
}

/// Offline adapter with one canned line per mood.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedInsightService;

impl SimulatedInsightService {
    fn line_for(mood: Option<Mood>) -> &'static str {
        match mood {
            Some(Mood::Happy) => "Savor this feeling and notice what helped create it.",
            Some(Mood::Calm) => "Take a breath, you're doing fine.",
            Some(Mood::Sad) => "It's okay to feel low. Be as kind to yourself as you would be to a friend.",
            Some(Mood::Angry) => "Your frustration makes sense. A short walk can help it settle.",
            Some(Mood::Anxious) => "Try naming one small thing you can control right now.",
            None => "Thank you for taking a moment to check in with yourself.",
        }
    }
}

impl InsightService for SimulatedInsightService {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn generate_insight(&self, prompt: &InsightPrompt) -> Result<String, ServiceError> {
        let mood = prompt
            .user
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("Mood: "))
            .and_then(Mood::from_label);
        Ok(Self::line_for(mood).to_string())
    }
}
