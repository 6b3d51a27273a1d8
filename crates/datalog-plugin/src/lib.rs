//! Datalog plugin engine.
//!
//! Watches the stored objects of an interactive session, lists the ones that
//! carry a data table, and imports the chosen table into the host workspace.
//!
//! - [`catalog`] and [`normalizer`]: stored objects to importable tables.
//! - [`ledger`]: which objects already have records in the host.
//! - [`executor`]: the import write path.
//! - [`plugin`]: the event loop tying it together.
//!
//! The host and the object storage are collaborators behind
//! [`host::HostClient`] and [`storage::ObjectStorage`]; [`memory`] provides
//! in-process versions of both.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod handshake;
pub mod highlight;
pub mod host;
pub mod ledger;
pub mod memory;
pub mod normalizer;
pub mod plugin;
pub mod records;
pub mod selection;
pub mod storage;
pub mod subscription;
pub mod thumbnails;

pub use error::{HandshakeError, HostError, ImportError, PluginError, StorageError};
pub use plugin::{DatalogPlugin, EntryView, PluginEvent, PluginHandle, PluginView};
