//! Error types for the plugin engine.
//!
//! Failures fall into three groups with different handling:
//! - [`HandshakeError`]: fatal, replaces the whole view, no retry.
//! - [`ImportError`]: local to one "Get Data" action, shown as an alert;
//!   the object stays not-imported and the user may retry.
//! - Best-effort failures (highlight, thumbnails) never leave their module;
//!   they are logged and swallowed.

use thiserror::Error;

/// Errors from the host request channel.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host answered with `success: false`.
    #[error("Host rejected {action} {resource}")]
    Rejected { action: String, resource: String },

    /// The host answered, but not in the expected shape.
    #[error("Unexpected host response for {resource}: {reason}")]
    Malformed { resource: String, reason: String },

    /// The request never reached the host or the host went away.
    #[error("Host transport error: {0}")]
    Transport(String),
}

/// Errors from the object-storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage config could not be turned into a storage handle.
    #[error("Invalid object storage config: {0}")]
    Config(String),

    /// A read failed inside the storage layer.
    #[error("Object storage read failed: {0}")]
    Read(String),
}

/// Fatal handshake failures, one per user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error(
        "Failed to connect to Interactive API.  Make sure you are running this in CODAP v3 or later under Activity Player."
    )]
    ApiUnreachable,

    #[error("Interactive API is not available. Make sure you are running this in Activity Player.")]
    ApiUnavailable,

    #[error("Interactive API result is not valid - initInteractive is missing.")]
    ApiMalformed,

    #[error(
        "The objectStorageConfig is missing in the Interactive API response.  Make sure you are using the latest version of Activity Player."
    )]
    MissingStorageConfig,

    #[error(
        "The dataSourceInteractive query param is missing.  Make sure to add a ?dataSourceInteractive=<id> query parameter to the URL.  This will be fixed once CODAP authoring is added to LARA."
    )]
    MissingSourceId,
}

/// Failures of a single import action.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Nothing is selected.
    #[error("No data set is selected.")]
    NothingSelected,

    /// The selection does not resolve to a catalog entry.
    #[error("Failed to get the selected object.")]
    UnknownObject { object_id: String },

    /// Storage returned nothing for the data table item.
    #[error("The selected object does not contain a data table item.")]
    MissingDataTable { object_id: String },

    /// Row retrieval did not finish within the configured timeout.
    #[error("Timed out retrieving data for the selected object.")]
    Timeout { object_id: String },

    #[error("The selected object has already been imported.")]
    AlreadyImported { object_id: String },

    #[error("The selected object is already being imported.")]
    AlreadyInFlight { object_id: String },

    /// The row payload could not be decoded.
    #[error("The selected object's data table could not be read: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A host write failed part-way; earlier steps are not rolled back.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Umbrella error for the plugin event loop.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
