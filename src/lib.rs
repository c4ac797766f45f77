//! docbridge - Client for a Code Documentation Generation Platform
//!
//! Uploads zipped source repositories to a backend analysis service,
//! follows running analysis tasks live over WebSocket, browses the
//! extracted component trees, and exports finished documentation as a
//! single self-contained HTML file.
//!
//! The analysis itself (repository unpacking, dependency extraction,
//! AI-assisted documentation synthesis) happens entirely in the backend;
//! this crate owns the client-side state synchronization and rendering.
//!
//! ## Quick Start
//!
//! ```ignore
//! use docbridge::{ApiClient, ConfigLoader, HtmlExporter, ExportOptions};
//!
//! let config = ConfigLoader::load()?;
//! let client = ApiClient::new(&config.backend)?;
//! let record = client.get_documentation("651f...").await?;
//! let mut exporter = HtmlExporter::new(&client, ExportOptions::from_config(&config));
//! let artifact = exporter.export(&record).await?;
//! std::fs::write(&artifact.file_name, artifact.bytes())?;
//! ```
//!
//! ## Modules
//!
//! - [`client`]: REST client wrapper with normalized error reporting
//! - [`stream`]: WebSocket job-status stream and its reconnect supervisor
//! - [`model`]: read-only views over the recursive component hierarchy
//! - [`export`]: standalone HTML export pipeline with image inlining
//! - [`config`]: layered configuration, validated at load
//! - [`cli`]: subcommand implementations

pub mod cli;
pub mod client;
pub mod config;
pub mod export;
pub mod model;
pub mod stream;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GenerationMode, SourceCodeMode};

// Error Types
pub use types::error::{BridgeError, Result};

// Domain Model
pub use types::{CodeComponent, ComponentType, JobStatusSnapshot, StatusPatch, TaskStatus};

// =============================================================================
// Client & Stream Re-exports
// =============================================================================

pub use client::ApiClient;
pub use stream::supervisor::{ReconnectPolicy, SupervisedStream};
pub use stream::{JobStatusStream, StatusSubscription};

// =============================================================================
// Model & Export Re-exports
// =============================================================================

pub use export::{ExportArtifact, ExportOptions, ExportState, HtmlExporter};
pub use model::{ComponentStats, check_integrity, find_by_id, flatten};
