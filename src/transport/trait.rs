use async_trait::async_trait;
use url::Url;
use crate::error::Result;

/// Raw reply from the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// POST `body` to `endpoint`.
    ///
    /// Any status code the server returns is a response; only failures before a
    /// response arrives (connect, timeout, body read) are errors.
    async fn post(&self, endpoint: &Url, body: &[u8]) -> Result<TransportResponse>;
}
