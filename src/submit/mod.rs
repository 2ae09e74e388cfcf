//! Document submission through the admission gate.

pub mod document;
mod http;
mod sender;
mod service;

pub use document::{Description, Document, Product};
pub use http::{HttpSender, SIGNATURE_HEADER};
pub use sender::{DocumentSender, SendOutcome, SubmissionError, SubmissionRequest};
pub use service::SubmissionService;
