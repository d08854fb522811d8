use std::time::Duration;
use std::time::Instant;

use mood_core::config::InsightConfig;
use mood_core::error::ServiceError;
use mood_core::insight::InsightPrompt;

use super::contracts::parse_completion;
use super::contracts::InsightPayload;
use super::service::InsightService;

/// Talks to a JSON chat endpoint that answers with `{"completion": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpInsightService {
    client: reqwest::blocking::Client,
    endpoint: String,
    retry_once: bool,
}

impl HttpInsightService {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        retry_once: bool,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry_once,
        })
    }

    pub fn from_config(config: &InsightConfig) -> Result<Self, ServiceError> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
            config.retry_once,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post_once(&self, payload: &InsightPayload) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let body = response.text().map_err(classify)?;
        parse_completion(&body)
    }
}

impl InsightService for HttpInsightService {
    fn name(&self) -> &'static str {
        "http"
    }

    fn generate_insight(&self, prompt: &InsightPrompt) -> Result<String, ServiceError> {
        let payload = InsightPayload::from(prompt);
        let started = Instant::now();

        let mut result = self.post_once(&payload);
        if self.retry_once {
            if let Err(err) = &result {
                if err.is_retryable() {
                    tracing::warn!("insight request failed ({}), retrying once", err);
                    result = self.post_once(&payload);
                }
            }
        }

        match &result {
            Ok(completion) => tracing::debug!(
                endpoint = %self.endpoint,
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = completion.len(),
                "insight received"
            ),
            Err(err) => tracing::warn!(
                endpoint = %self.endpoint,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "insight request failed: {}",
                err
            ),
        }
        result
    }
}

fn classify(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::TimedOut
    } else if err.is_decode() {
        ServiceError::Malformed(err.to_string())
    } else {
        ServiceError::Transport(err.to_string())
    }
}
