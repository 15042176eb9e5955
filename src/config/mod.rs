//! Configuration model for buildgate.
//!
//! Built once at process entry: YAML file, then environment overlay, then
//! validation. Commands receive the result by reference.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Config;
pub use types::AdmissionMode;
