use serde::Serialize;
use crate::error::Result;

/// Turns a document into the request body.
pub trait DocumentCodec: Send + Sync {
    fn encode<D: Serialize + ?Sized>(&self, document: &D) -> Result<Vec<u8>>;
}

/// Encodes documents as compact JSON. Field naming is left to the document's serde attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn encode<D: Serialize + ?Sized>(&self, document: &D) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(document)?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::mocks::Unserializable;
    use crate::error::AppError;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_codec_encodes_compact_json() {
        let mut doc = BTreeMap::new();
        doc.insert("doc_id", "abc");
        doc.insert("doc_type", "LP_INTRODUCE_GOODS");

        let bytes = JsonCodec.encode(&doc).unwrap();
        assert_eq!(bytes, br#"{"doc_id":"abc","doc_type":"LP_INTRODUCE_GOODS"}"#.to_vec());
    }

    #[test]
    fn test_json_codec_surfaces_serialization_error() {
        let result = JsonCodec.encode(&Unserializable);
        match result {
            Err(AppError::Serialization(e)) => assert!(e.to_string().contains("cannot be encoded")),
            other => panic!("expected serialization error, got {:?}", other.map(|b| b.len())),
        }
    }
}
