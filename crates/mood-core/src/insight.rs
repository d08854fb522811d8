//! Validation and prompt composition for insight requests.
//!
//! Everything here is pure: the reducer decides *whether* to dispatch, the
//! executor crate decides *how* to talk to the service.

use super::error::ValidationError;
use super::state::Draft;
use super::state::InsightPolicy;
use super::state::InsightTicket;
use super::state::Mood;
use super::state::Selection;

pub const MIN_INSIGHT_WORDS: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are an empathetic mental health assistant. Provide brief, caring insights about the user's mood and journal entry.";

const UNSPECIFIED_MOOD_LABEL: &str = "unspecified";

/// Counts runs of non-whitespace.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn validate_insight_request(
    selection: &Selection,
    draft: &Draft,
    policy: InsightPolicy,
) -> Result<(), ValidationError> {
    let words = count_words(&draft.journal_text);
    if words < policy.min_words {
        return Err(ValidationError::InsufficientContent {
            words,
            required: policy.min_words,
        });
    }
    if policy.require_mood && selection.mood.is_none() {
        return Err(ValidationError::NoMoodSelected);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightPrompt {
    pub system: String,
    pub user: String,
}

impl InsightPrompt {
    pub fn compose(mood: Option<Mood>, journal_text: &str) -> Self {
        let label = mood.map_or(UNSPECIFIED_MOOD_LABEL, Mood::label);
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: format!(
                "Mood: {label}\nJournal: {journal_text}\nProvide a short, supportive insight."
            ),
        }
    }
}

/// Snapshot of the draft captured at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRequest {
    pub ticket: InsightTicket,
    pub mood: Option<Mood>,
    pub journal_text: String,
}

impl InsightRequest {
    pub fn prompt(&self) -> InsightPrompt {
        InsightPrompt::compose(self.mood, &self.journal_text)
    }
}
