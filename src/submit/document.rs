//! Registry document model.
//!
//! Field names follow the registry's JSON contract exactly, which mixes
//! snake_case and camelCase. Values are carried as given; nothing here
//! validates tax ids, dates or codes.

use serde::{Deserialize, Serialize};

/// Document type used for introducing goods into circulation.
pub const INTRODUCE_GOODS: &str = "LP_INTRODUCE_GOODS";

/// A goods-introduction document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    pub doc_id: String,
    pub doc_status: String,
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    #[serde(rename = "importRequest", default)]
    pub import_request: bool,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    pub production_date: String,
    pub production_type: String,
    #[serde(default)]
    pub products: Vec<Product>,
    pub reg_date: String,
    pub reg_number: String,
}

fn default_doc_type() -> String {
    INTRODUCE_GOODS.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// A single product line in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub certificate_document: String,
    pub certificate_document_date: String,
    pub certificate_document_number: String,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: String,
    pub tnved_code: String,
    pub uit_code: String,
    pub uitu_code: String,
}
