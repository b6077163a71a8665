//! Shared domain types for the ClimaSmart platform
//!
//! This crate contains the record shapes produced by the AI generation
//! pipeline, the extraction engine that turns raw model text into validated
//! records, and common payload types. It is pure logic with no I/O.

pub mod extract;
pub mod models;
pub mod types;

pub use extract::*;
pub use models::*;
pub use types::*;
