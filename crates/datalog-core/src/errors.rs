//! Cross-cutting error types for Datalog.
//!
//! Collaborator and engine errors (`HostError`, `StorageError`, `ImportError`)
//! live in `datalog-plugin`; this module only covers failures of the shared
//! types themselves.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Stored-object metadata did not match any known schema version.
    #[error("Unsupported metadata for object {object_id}: {reason}")]
    Metadata { object_id: String, reason: String },
}
