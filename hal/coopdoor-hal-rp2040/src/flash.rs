//! Flash settings store for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash.
//!
//! The core persists settings synchronously from inside the control
//! loop, so every operation here drives the async flash future to
//! completion with `block_on`.

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from coopdoor-hal
pub use coopdoor_hal::storage::{StorageError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const SETTINGS_PARTITION_SIZE: usize = 64 * 1024; // 64KB for settings
pub const SETTINGS_PARTITION_START: usize = FLASH_SIZE - SETTINGS_PARTITION_SIZE;


/// Flash range for the settings partition
pub const SETTINGS_RANGE: core::ops::Range<u32> =
    (SETTINGS_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer size; every stored value is a few bytes
const ITEM_BUFFER_SIZE: usize = 64;

/// RP2040 flash settings store
///
/// Provides wear-leveled key-value storage for the persisted settings.
pub struct Rp2040SettingsStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040SettingsStore<'d> {
    /// Create a new settings store instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl<'d> coopdoor_hal::KeyValueStore for Rp2040SettingsStore<'d> {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = block_on(map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        ));

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(StorageError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(StorageError::NotFound),
            Err(_) => Err(StorageError::Corrupted),
        }
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        block_on(map::store_item(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        ))
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => StorageError::Full,
            _ => StorageError::Flash,
        })
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        let start = SETTINGS_PARTITION_START as u32;
        let end = FLASH_SIZE as u32;

        block_on(self.flash.erase(start, end)).map_err(|_| StorageError::Flash)
    }
}
