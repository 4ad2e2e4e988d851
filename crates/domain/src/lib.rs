//! Domain layer for the Event Suite backend.
//!
//! This crate contains:
//! - Domain models and request payloads (User, Event, Registration, ...)
//! - Repository traits and the in-memory repository backend
//! - Business logic services
//! - Domain error types

pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use error::{DomainError, DomainResult};
