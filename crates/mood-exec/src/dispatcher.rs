use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use mood_core::error::ServiceError;
use mood_core::insight::InsightRequest;
use mood_core::state::InsightTicket;

use super::service::InsightService;

const PANICKED_MESSAGE: &str = "insight service panicked";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightResolution {
    pub ticket: InsightTicket,
    pub outcome: Result<String, ServiceError>,
}

/// Runs the request off the caller's thread and hands the tagged result to `on_done`.
///
/// The ticket travels with the result untouched; deciding whether it is still
/// current is the state container's job. A panicking service resolves as a
/// transport failure.
pub fn spawn_insight<F>(
    service: Arc<dyn InsightService>,
    request: InsightRequest,
    on_done: F,
) -> JoinHandle<()>
where
    F: FnOnce(InsightResolution) + Send + 'static,
{
    thread::spawn(move || {
        let span = tracing::info_span!(
            "insight",
            ticket = request.ticket.0,
            service = service.name()
        );
        let _enter = span.enter();

        let prompt = request.prompt();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| service.generate_insight(&prompt)))
            .unwrap_or_else(|_| {
                tracing::error!("insight service panicked");
                Err(ServiceError::Transport(PANICKED_MESSAGE.to_string()))
            });
        on_done(InsightResolution {
            ticket: request.ticket,
            outcome,
        });
    })
}
