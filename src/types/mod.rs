//! Core domain types: components, task snapshots, and the unified error
//! type.

pub mod component;
pub mod error;
pub mod snapshot;

pub use component::{
    CodeComponent, ComponentType, DocRow, DocgenFinalState, DocumentationJson, FinalState,
};
pub use error::{BridgeError, Result};
pub use snapshot::{JobStatusSnapshot, StatusPatch, TaskStatus};
