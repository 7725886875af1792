//! RP2040-specific HAL for the brewing controller firmware
//!
//! Implements the `mosto-hal` storage traits on the on-board QSPI flash:
//!
//! - Configuration map partition (implements `mosto_hal::FlashStorage`)
//! - Brewing log queue partition (implements `mosto_hal::LogStorage`)

#![no_std]

pub mod flash;

// Re-export shared traits from mosto-hal for convenience
pub use mosto_hal::{FlashStorage as FlashStorageTrait, LogStorage, StorageKey};
