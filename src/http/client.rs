use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use crate::http::pool::create_http_client;
use crate::transport::{DocumentTransport, TransportResponse};

const JSON_CONTENT_TYPE: &str = "application/json";

/// `reqwest`-backed transport. Cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    auth_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = create_http_client(config)?;
        Ok(Self::from_client(client, config.auth_token.clone()))
    }

    pub fn from_client(client: Client, auth_token: Option<String>) -> Self {
        Self { client, auth_token }
    }
}

#[async_trait]
impl DocumentTransport for HttpTransport {
    async fn post(&self, endpoint: &Url, body: &[u8]) -> Result<TransportResponse> {
        let mut request = self.client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.to_vec());

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("Body error: {}", e)))?;

        debug!("POST {} -> {}", endpoint, status);
        Ok(TransportResponse { status, body })
    }
}
