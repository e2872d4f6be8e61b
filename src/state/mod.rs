//! State Management Module
//!
//! Provides durable key-value storage backends, the snapshot record format,
//! and the per-layer Settings Store built on top of them.

pub mod settings;
pub mod snapshot;
pub mod storage;

pub use settings::{SettingsStore, DEFAULT_NAMESPACE};
pub use snapshot::{SettingsSnapshot, SNAPSHOT_VERSION};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
