//! Configuration
//!
//! Layered configuration (defaults → global file → project file → env),
//! validated at load time so misconfiguration fails before the first
//! backend call.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BackendConfig, Config, ExportSettings, GenerationMode, SourceCodeMode};
