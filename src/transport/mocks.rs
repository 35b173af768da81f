use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use url::Url;

use crate::error::{AppError, Result};
use crate::transport::{DocumentTransport, TransportResponse};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Fail(&'static str),
}

/// In-memory transport answering every call with the same reply.
#[derive(Debug)]
pub struct ScriptedTransport {
    reply: Reply,
    delay: Duration,
    bodies: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn always(reply: Reply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().len()
    }

    pub fn bodies(&self) -> Vec<Vec<u8>> {
        self.bodies.lock().clone()
    }
}

#[async_trait]
impl DocumentTransport for ScriptedTransport {
    async fn post(&self, _endpoint: &Url, body: &[u8]) -> Result<TransportResponse> {
        self.bodies.lock().push(body.to_vec());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Reply::Status(status) => Ok(TransportResponse {
                status: *status,
                body: String::new(),
            }),
            Reply::Fail(cause) => Err(AppError::Transport(cause.to_string())),
        }
    }
}
