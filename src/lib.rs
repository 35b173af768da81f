pub mod analytics;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod http;
pub mod transport;
pub mod utils;

pub use api::DocumentClient;
pub use error::{AppError, Result};
