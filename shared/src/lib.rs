//! Shared types for the PDV printing stack
//!
//! Printer configuration and normalized print job models used by
//! `pdv-print` and persisted by the settings screen.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};
