use chrono::NaiveDate;
use uuid::Uuid;

use crate::document::model::{Description, Document, Product, DOC_TYPE_INTRODUCE_GOODS};

const MAX_PRODUCTS: u8 = 4;
const FIELD_LEN: usize = 8;
pub const LABEL_LEN: usize = 10;

/// Random identifier of up to 32 lowercase hex characters.
pub fn random_string(len: usize) -> String {
    let mut value = Uuid::new_v4().simple().to_string();
    value.truncate(len);
    value
}

/// Generates filler documents for load runs against the endpoint.
#[derive(Debug, Clone)]
pub struct SampleDocuments {
    date: NaiveDate,
}

impl Default for SampleDocuments {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2020, 1, 23).unwrap_or_default(),
        }
    }
}

impl SampleDocuments {
    pub fn document(&self) -> Document {
        let product_count = Uuid::new_v4().as_bytes()[0] % MAX_PRODUCTS + 1;
        let products = (0..product_count).map(|_| self.product()).collect();

        Document {
            description: Description {
                participant_inn: random_string(FIELD_LEN),
            },
            doc_id: random_string(FIELD_LEN),
            doc_status: random_string(FIELD_LEN),
            doc_type: DOC_TYPE_INTRODUCE_GOODS.to_string(),
            import_request: true,
            owner_inn: random_string(FIELD_LEN),
            participant_inn: random_string(FIELD_LEN),
            producer_inn: random_string(FIELD_LEN),
            production_date: self.date,
            production_type: random_string(FIELD_LEN),
            products,
            reg_date: self.date,
            reg_number: random_string(FIELD_LEN),
        }
    }

    /// `count` documents, each paired with a random reporting label.
    pub fn batch(&self, count: usize) -> Vec<(Document, String)> {
        (0..count)
            .map(|_| (self.document(), random_string(LABEL_LEN)))
            .collect()
    }

    fn product(&self) -> Product {
        Product {
            certificate_document: random_string(FIELD_LEN),
            certificate_document_date: self.date,
            certificate_document_number: random_string(FIELD_LEN),
            owner_inn: random_string(FIELD_LEN),
            producer_inn: random_string(FIELD_LEN),
            production_date: self.date,
            tnved_code: random_string(FIELD_LEN),
            uit_code: random_string(FIELD_LEN),
            uitu_code: random_string(FIELD_LEN),
        }
    }
}
