//! Database models for the ClimaSmart backend
//!
//! Re-exports the shared pipeline record shapes and payload types; the row
//! types live with the services that own them.

pub use shared::models::*;
pub use shared::types::*;
