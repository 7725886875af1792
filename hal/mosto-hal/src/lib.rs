//! Mosto Hardware Abstraction Layer
//!
//! Storage traits implemented by chip-specific HALs so the firmware can
//! persist its configuration and brewing log without knowing the flash
//! layout.
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Keyed storage for configuration blobs
//! - [`log::LogStorage`] - Bounded append-only record log

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod log;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use log::LogStorage;
