pub mod model;
pub mod sample;

pub use model::{Description, Document, Product};
pub use sample::SampleDocuments;
