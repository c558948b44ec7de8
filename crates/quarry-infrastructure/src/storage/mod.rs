//! File-backed configuration storage.

mod config_storage;

pub use config_storage::ConfigStorage;
