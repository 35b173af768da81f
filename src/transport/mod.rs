mod r#trait;
#[cfg(test)]
pub mod mocks;

pub use r#trait::{DocumentTransport, TransportResponse};
