//! Persistence layer for the Event Suite backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain repository traits
//! - The [`registry::AppRegistry`] that wires a storage backend together

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod repositories;
