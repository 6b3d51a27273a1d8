//! In-process collaborators.
//!
//! [`MemoryHost`] keeps data contexts in memory and answers the request
//! protocol the plugin speaks; [`MemoryStorage`] holds stored objects and item
//! payloads. The CLI drives the plugin against them from a fixture file and
//! the test suites use them as fakes.

mod host;
mod storage;

pub use host::MemoryHost;
pub use storage::{MemoryStorage, MemoryStorageFactory};
