//! Data models
//!
//! Shared between the print service and the settings screen (via JSON).

pub mod print_job;
pub mod printer;

// Re-exports
pub use print_job::*;
pub use printer::*;
