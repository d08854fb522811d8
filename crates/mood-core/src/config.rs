use serde::{Deserialize, Serialize};

pub const DEFAULT_INSIGHT_ENDPOINT: &str = "https://api.a0.dev/ai/llm";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub insight: InsightConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct InsightConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub retry_once: bool,
    pub min_words: usize,
    pub require_mood: bool,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INSIGHT_ENDPOINT.to_string(),
            timeout_secs: 30,
            retry_once: false,
            min_words: super::insight::MIN_INSIGHT_WORDS,
            require_mood: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub notice_ttl_ms: u64,
    pub pulse_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_ttl_ms: 3_500,
            pulse_ms: 400,
        }
    }
}
