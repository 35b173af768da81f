use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::analytics::stats::Stats;
use crate::api::codec::{DocumentCodec, JsonCodec};
use crate::config::ClientConfig;
use crate::dispatch::{CompletionSink, Dispatcher, LoggingSink, PendingRequest, SubmissionHandle};
use crate::error::{AppError, Result};
use crate::http::{HttpTransport, RateGate};
use crate::transport::DocumentTransport;

/// Rate-limited client for the document registration endpoint.
///
/// Every submission waits on a shared [`RateGate`] and is then handed to the
/// [`Dispatcher`]; the caller gets a [`SubmissionHandle`] back as soon as the
/// request is in flight. Share it between tasks behind an `Arc`.
pub struct DocumentClient<T = HttpTransport, C = JsonCodec> {
    gate: Arc<RateGate>,
    dispatcher: Dispatcher<T>,
    codec: C,
    sink: Arc<dyn CompletionSink>,
    stats: Arc<Stats>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl DocumentClient<HttpTransport, JsonCodec> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }
}

impl<T: DocumentTransport + 'static> DocumentClient<T, JsonCodec> {
    pub fn with_transport(config: &ClientConfig, transport: Arc<T>) -> Result<Self> {
        let gate = Arc::new(RateGate::new(config.request_limit, config.window())?);
        let stats = Arc::new(Stats::new());
        let dispatcher = Dispatcher::new(transport, config.endpoint()?, stats.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            "Document client configured: {} requests per {:?} to {}",
            gate.limit(),
            gate.window(),
            dispatcher.endpoint()
        );

        Ok(Self {
            gate,
            dispatcher,
            codec: JsonCodec,
            sink: Arc::new(LoggingSink),
            stats,
            shutdown_tx,
            shutdown_rx,
        })
    }
}

impl<T: DocumentTransport + 'static, C> DocumentClient<T, C> {
    pub fn with_codec<C2: DocumentCodec>(self, codec: C2) -> DocumentClient<T, C2> {
        DocumentClient {
            gate: self.gate,
            dispatcher: self.dispatcher,
            codec,
            sink: self.sink,
            stats: self.stats,
            shutdown_tx: self.shutdown_tx,
            shutdown_rx: self.shutdown_rx,
        }
    }

    /// Replaces the default [`LoggingSink`].
    pub fn with_sink(mut self, sink: impl CompletionSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Wakes every caller waiting for a permit with [`AppError::Cancelled`] and
    /// refuses further submissions. Requests already in flight still complete.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Waits for a permit, then sends `payload` without waiting for the response.
    pub async fn submit_document(&self, payload: Vec<u8>, label: impl Into<String>) -> Result<SubmissionHandle> {
        let label = label.into();
        let mut shutdown = self.shutdown_rx.clone();

        if let Err(e) = self.gate.acquire_until(&mut shutdown).await {
            self.stats.inc_cancelled();
            warn!("[{}] Not sent: {}", label, e);
            return Err(e);
        }

        let handle = self.dispatcher.submit(PendingRequest::new(payload, label), self.sink.clone());
        info!("[{}] Document creation request sent", handle.label());
        Ok(handle)
    }
}

impl<T: DocumentTransport + 'static, C: DocumentCodec> DocumentClient<T, C> {
    /// Encodes `document` and submits it.
    ///
    /// Encoding happens before the gate is consulted, so a document that fails
    /// to encode uses no permit and is never sent.
    pub async fn create_document<D: Serialize + ?Sized>(&self, document: &D, label: &str) -> Result<SubmissionHandle> {
        let payload = match self.codec.encode(document) {
            Ok(payload) => payload,
            Err(e) => {
                self.stats.inc_serialization_failures();
                error!("[{}] Failed to encode document: {}", label, e);
                return Err(e);
            }
        };

        self.submit_document(payload, label).await
    }
}

impl<T, C> std::fmt::Debug for DocumentClient<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentClient")
            .field("gate", &self.gate)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
