//! # autotheme-adapter-storage-file
//!
//! File-backed implementations of the storage ports:
//!
//! - [`FileConfigStore`]: the switch configuration as a TOML document
//! - [`FileLocationCache`]: read-only view of the JSON location cache the
//!   background service writes
//!
//! A missing file is not an error for either; callers get defaults.

pub mod config_store;
pub mod error;
pub mod location_cache;

pub use config_store::FileConfigStore;
pub use error::FileStoreError;
pub use location_cache::FileLocationCache;
