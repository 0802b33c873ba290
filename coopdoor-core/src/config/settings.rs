//! Persisted user settings
//!
//! Each setting lives under its own [`StorageKey`] as a postcard value.
//! Writes happen only on explicit commits (menu save, door moves); a
//! missing or unreadable value falls back to its default at boot.

use coopdoor_hal::{KeyValueStore, StorageError, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::sun::ClockConfig;

/// Scratch space for one encoded value
const VALUE_BUFFER_SIZE: usize = 16;

/// Errors from loading or saving a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Underlying store failed
    Storage(StorageError),
    /// Value did not fit the encode buffer
    Encode,
    /// Stored bytes are not a valid value of the expected type
    Decode,
}

impl From<StorageError> for SettingsError {
    fn from(e: StorageError) -> Self {
        SettingsError::Storage(e)
    }
}

/// Encode and store one value
pub fn save<K, V>(store: &mut K, key: StorageKey, value: &V) -> Result<(), SettingsError>
where
    K: KeyValueStore + ?Sized,
    V: Serialize,
{
    let mut buf = [0u8; VALUE_BUFFER_SIZE];
    let bytes = postcard::to_slice(value, &mut buf).map_err(|_| SettingsError::Encode)?;
    store.write(key, bytes)?;
    debug!("Saved {} ({} bytes)", key, bytes.len());
    Ok(())
}

/// Read and decode one value
pub fn load_value<K, V>(store: &mut K, key: StorageKey) -> Result<V, SettingsError>
where
    K: KeyValueStore + ?Sized,
    V: DeserializeOwned,
{
    let mut buf = [0u8; VALUE_BUFFER_SIZE];
    let len = store.read(key, &mut buf)?;
    postcard::from_bytes(&buf[..len]).map_err(|_| SettingsError::Decode)
}

fn load_or<K, V>(store: &mut K, key: StorageKey, default: V) -> V
where
    K: KeyValueStore + ?Sized,
    V: DeserializeOwned,
{
    match load_value(store, key) {
        Ok(value) => value,
        Err(SettingsError::Storage(StorageError::NotFound)) => {
            debug!("{} not stored, using default", key);
            default
        }
        Err(e) => {
            warn!("Failed to load {}: {}, using default", key, e);
            default
        }
    }
}

/// Every persisted value, as loaded at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub timezone_offset_minutes: i16,
    pub open_delay_minutes: i16,
    pub close_delay_minutes: i16,
    pub steps_to_close: u32,
    pub door_open: bool,
}

impl Settings {
    /// Load all settings, substituting defaults for anything missing
    pub fn load<K: KeyValueStore + ?Sized>(store: &mut K) -> Self {
        let defaults = Self::default();
        let settings = Self {
            timezone_offset_minutes: load_or(
                store,
                StorageKey::Timezone,
                defaults.timezone_offset_minutes,
            ),
            open_delay_minutes: load_or(store, StorageKey::OpenDelay, defaults.open_delay_minutes),
            close_delay_minutes: load_or(
                store,
                StorageKey::CloseDelay,
                defaults.close_delay_minutes,
            ),
            steps_to_close: load_or(store, StorageKey::StepsToClose, defaults.steps_to_close),
            door_open: load_or(store, StorageKey::DoorOpen, defaults.door_open),
        };

        info!("Settings loaded: {}", settings);
        settings
    }

    /// The clock offsets from these settings
    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            timezone_offset_minutes: self.timezone_offset_minutes,
            open_delay_minutes: self.open_delay_minutes,
            close_delay_minutes: self.close_delay_minutes,
        }
    }
}
