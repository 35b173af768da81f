pub mod client;
pub mod codec;

pub use client::DocumentClient;
pub use codec::{DocumentCodec, JsonCodec};
