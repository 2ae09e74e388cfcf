//! Tollgate - Windowed Admission Gate for Document Submissions
//!
//! This crate limits how many document submissions a process may send to a
//! remote registry within a fixed time window. Callers over the limit are
//! suspended until the next window reset instead of being rejected.

pub mod config;
pub mod error;
pub mod gate;
pub mod submit;
