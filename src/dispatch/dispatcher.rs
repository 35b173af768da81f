use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use url::Url;

use crate::analytics::stats::Stats;
use crate::dispatch::sink::CompletionSink;
use crate::dispatch::types::{CompletionResult, PendingRequest, RequestState};
use crate::error::{AppError, Result};
use crate::transport::DocumentTransport;
use crate::utils::time::{elapsed_ms, now_instant};

/// Sends admitted requests without blocking the caller.
///
/// The dispatcher does not consult the rate gate; callers must hold a permit
/// before calling [`submit`](Self::submit). Requests are independent: no
/// retries, no ordering between completions.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    endpoint: Arc<Url>,
    stats: Arc<Stats>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            endpoint: self.endpoint.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<T: DocumentTransport + 'static> Dispatcher<T> {
    pub fn new(transport: Arc<T>, endpoint: Url, stats: Arc<Stats>) -> Self {
        Self {
            transport,
            endpoint: Arc::new(endpoint),
            stats,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Spawns the outbound call and returns at once.
    ///
    /// `sink` is invoked exactly once with the outcome; the same outcome is
    /// available from the returned handle. Must be called inside a tokio runtime.
    pub fn submit(&self, request: PendingRequest, sink: Arc<dyn CompletionSink>) -> SubmissionHandle {
        let label = request.label().to_string();
        self.stats.inc_submitted();
        debug!("Request {} {:?} -> {:?}", label, RequestState::Pending, RequestState::InFlight);

        let transport = self.transport.clone();
        let endpoint = self.endpoint.clone();
        let stats = self.stats.clone();

        let inner = tokio::spawn(async move {
            let started = now_instant();
            let result = match transport.post(&endpoint, request.payload()).await {
                Ok(response) => CompletionResult::from_response(&response),
                Err(e) => CompletionResult::TransportFailure(e.to_string()),
            };

            let latency = elapsed_ms(started);
            stats.record_outcome(&result);
            stats.update_dispatch_latency(latency);
            debug!(
                "Request {} {:?} -> {:?} after {}ms",
                request.label(),
                RequestState::InFlight,
                RequestState::from(&result),
                latency
            );

            // Sink panics are contained; the handle still yields the outcome.
            if panic::catch_unwind(AssertUnwindSafe(|| sink.complete(request.label(), &result))).is_err() {
                error!("Completion sink panicked for request {}", request.label());
            }
            result
        });

        SubmissionHandle { label, inner }
    }
}

/// Awaitable view of one submitted request.
#[derive(Debug)]
pub struct SubmissionHandle {
    label: String,
    inner: JoinHandle<CompletionResult>,
}

impl SubmissionHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Waits for the outcome already delivered to the sink.
    pub async fn outcome(self) -> Result<CompletionResult> {
        self.inner
            .await
            .map_err(|e| AppError::Dispatch(format!("Request {} did not complete: {}", self.label, e)))
    }
}
