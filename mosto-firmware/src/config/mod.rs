//! Configuration loading
//!
//! Sources, in order: postcard blob in flash, the embedded `brewer.toml`,
//! built-in defaults.

pub mod loader;

pub use loader::{load_config, log_config_summary, ConfigPersistence};
