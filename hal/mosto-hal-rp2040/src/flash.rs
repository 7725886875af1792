//! Flash storage driver for RP2040
//!
//! The top of flash holds two partitions managed by sequential-storage:
//!
//! ```text
//! | firmware ... | log queue (256 KB) | config map (16 KB) |
//!                                                     FLASH_SIZE
//! ```
//!
//! `memory.x` must keep the firmware image below `LOG_PARTITION_START`.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::{map, queue};

// Re-export shared types from mosto-hal
pub use mosto_hal::flash::{FlashError, StorageKey};
use mosto_hal::log::MAX_RECORD_LEN;

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB on the Pico
pub const CONFIG_PARTITION_SIZE: usize = 4 * ERASE_SIZE;
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;
pub const LOG_PARTITION_SIZE: usize = 64 * ERASE_SIZE;
pub const LOG_PARTITION_START: usize = CONFIG_PARTITION_START - LOG_PARTITION_SIZE;

/// Largest configuration blob
const CONFIG_BUFFER_LEN: usize = 512;

/// Flash range for the config partition
pub const CONFIG_RANGE: Range<u32> = (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Flash range for the log partition
pub const LOG_RANGE: Range<u32> = (LOG_PARTITION_START as u32)..(CONFIG_PARTITION_START as u32);

/// RP2040 flash storage
///
/// Owns the flash peripheral and serves both the configuration map and the
/// brewing log.
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> mosto_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; CONFIG_BUFFER_LEN];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > CONFIG_BUFFER_LEN / 2 {
            return Err(FlashError::BufferTooSmall);
        }
        let mut data_buffer = [0u8; CONFIG_BUFFER_LEN];

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(CONFIG_RANGE.start, CONFIG_RANGE.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}

impl<'d> mosto_hal::LogStorage for Rp2040FlashStorage<'d> {
    async fn append(&mut self, record: &[u8]) -> Result<(), FlashError> {
        if record.len() > MAX_RECORD_LEN {
            return Err(FlashError::BufferTooSmall);
        }

        queue::push(
            &mut self.flash,
            LOG_RANGE,
            &mut NoCache::new(),
            record,
            true, // drop the oldest records when full
        )
        .await
        .map_err(|_| FlashError::Storage)
    }

    async fn for_each<F: FnMut(&[u8])>(&mut self, mut f: F) -> Result<usize, FlashError> {
        let mut cache = NoCache::new();
        let mut iter = queue::iter(&mut self.flash, LOG_RANGE, &mut cache)
            .await
            .map_err(|_| FlashError::Storage)?;

        let mut buffer = [0u8; MAX_RECORD_LEN];
        let mut count = 0;
        while let Some(entry) = iter
            .next(&mut buffer)
            .await
            .map_err(|_| FlashError::Corrupted)?
        {
            f(&entry[..]);
            count += 1;
        }
        Ok(count)
    }

    async fn clear(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(LOG_RANGE.start, LOG_RANGE.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
