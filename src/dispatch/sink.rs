use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::dispatch::types::CompletionResult;

/// Receives the terminal outcome of each submitted request, exactly once.
///
/// Called on whichever runtime worker finished the request.
pub trait CompletionSink: Send + Sync + 'static {
    fn complete(&self, label: &str, result: &CompletionResult);
}

impl<F> CompletionSink for F
where
    F: Fn(&str, &CompletionResult) + Send + Sync + 'static,
{
    fn complete(&self, label: &str, result: &CompletionResult) {
        self(label, result)
    }
}

/// Reports outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl CompletionSink for LoggingSink {
    fn complete(&self, label: &str, result: &CompletionResult) {
        match result {
            CompletionResult::Accepted => info!("Document {} created", label),
            CompletionResult::Rejected(status) => {
                warn!("Document {} not created: endpoint returned {}", label, status)
            }
            CompletionResult::TransportFailure(cause) => {
                error!("Document {} not created: {}", label, cause)
            }
        }
    }
}

/// Forwards `(label, result)` pairs into a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub UnboundedSender<(String, CompletionResult)>);

impl CompletionSink for ChannelSink {
    fn complete(&self, label: &str, result: &CompletionResult) {
        if self.0.send((label.to_string(), result.clone())).is_err() {
            warn!("Completion receiver dropped, outcome for {} discarded", label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[test]
    fn test_closure_sink() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sink = move |_: &str, result: &CompletionResult| {
            assert!(result.is_accepted());
            counter.fetch_add(1, Ordering::SeqCst);
        };

        sink.complete("doc", &CompletionResult::Accepted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_sink_forwards_label_and_result() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink(tx);

        sink.complete("doc-7", &CompletionResult::Rejected(400));
        assert_eq!(rx.try_recv().unwrap(), ("doc-7".to_string(), CompletionResult::Rejected(400)));
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelSink(tx).complete("doc", &CompletionResult::Accepted);
    }
}
