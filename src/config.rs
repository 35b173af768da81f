use serde::{Deserialize, Deserializer};
use crate::error::{Result, AppError};
use std::time::Duration;
use config::{Config as ConfigLoader, File, Environment};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://ismp.crpt.ru/api/v3/";
pub const DEFAULT_CREATE_PATH: &str = "lk/documents/create";
const DEFAULT_REQUEST_LIMIT: u32 = 5;
const DEFAULT_WINDOW_MS: u64 = 1_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_BATCH_SIZE: usize = 20;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    // General
    pub log_level: String,
    pub log_format: LogFormat,

    // Endpoint
    pub base_url: String,
    pub create_path: String,
    #[serde(default)]
    pub auth_token: Option<String>,

    // Throttling
    pub request_limit: u32,
    #[serde(rename = "window_ms", deserialize_with = "duration_from_millis")]
    pub window: Duration,

    // Transport
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,

    // Demo batch submitted by the binary
    pub batch_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            base_url: DEFAULT_BASE_URL.to_string(),
            create_path: DEFAULT_CREATE_PATH.to_string(),
            auth_token: None,
            request_limit: DEFAULT_REQUEST_LIMIT,
            window: Duration::from_millis(DEFAULT_WINDOW_MS),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ClientConfig {
    /// Defaults with an explicit throttle of `limit` requests per `window`.
    pub fn with_limit(limit: u32, window: Duration) -> Self {
        Self {
            request_limit: limit,
            window,
            ..Self::default()
        }
    }

    /// Layers `crpt.toml` (optional) and `CRPT_*` environment variables over the defaults.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let loader = ConfigLoader::builder()
            .set_default("log_level", "info")?
            .set_default("log_format", "text")?
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("create_path", DEFAULT_CREATE_PATH)?
            .set_default("request_limit", DEFAULT_REQUEST_LIMIT as i64)?
            .set_default("window_ms", DEFAULT_WINDOW_MS as i64)?
            .set_default("connect_timeout_ms", DEFAULT_CONNECT_TIMEOUT_MS as i64)?
            .set_default("request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS as i64)?
            .set_default("batch_size", DEFAULT_BATCH_SIZE as i64)?
            .add_source(File::with_name("crpt").required(false))
            .add_source(Environment::with_prefix("CRPT").try_parsing(true))
            .build()?;

        let config: Self = loader.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_limit == 0 {
            return Err(AppError::InvalidConfiguration("request_limit must be greater than 0".into()));
        }
        if self.window.is_zero() {
            return Err(AppError::InvalidConfiguration("window must be greater than 0".into()));
        }
        self.endpoint()?;
        Ok(())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Base URL joined with the document creation path.
    pub fn endpoint(&self) -> Result<Url> {
        // Without the trailing slash `join` would replace the last segment of the base.
        let base = if self.base_url.ends_with('/') {
            Url::parse(&self.base_url)?
        } else {
            Url::parse(&format!("{}/", self.base_url))?
        };
        Ok(base.join(self.create_path.trim_start_matches('/'))?)
    }
}

/// The env and file layers carry the window as whole milliseconds.
fn duration_from_millis<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
