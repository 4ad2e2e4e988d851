//! Shared utilities and common types for the Event Suite backend.
//!
//! This crate provides functionality used across all other crates:
//! - Page-based pagination parameters and envelopes
//! - Common validation logic (phone numbers, date ranges, text limits)

pub mod pagination;
pub mod validation;
