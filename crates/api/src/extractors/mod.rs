//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data. Their rejections are
//! rendered as `validation_error` responses.

pub mod validated;

pub use validated::{ApiPath, ApiQuery, ValidatedJson};
