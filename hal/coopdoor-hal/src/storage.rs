//! Persistent storage abstractions
//!
//! Provides a small synchronous key-value store trait that chip-specific
//! HALs implement on top of their flash or EEPROM.

/// Storage keys for persisted settings
///
/// One key per value. The numeric ids are part of the on-flash format
/// and must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Timezone offset in minutes (i16)
    Timezone = 0,
    /// Minutes added to sunrise before opening (i16)
    OpenDelay = 1,
    /// Minutes added to sunset before closing (i16)
    CloseDelay = 2,
    /// Calibrated actuator steps for a full close (u32)
    StepsToClose = 3,
    /// Last known door position (bool)
    DoorOpen = 4,
}

impl StorageKey {
    /// Every key, in id order
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Timezone,
        StorageKey::OpenDelay,
        StorageKey::CloseDelay,
        StorageKey::StepsToClose,
        StorageKey::DoorOpen,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Timezone),
            1 => Some(StorageKey::OpenDelay),
            2 => Some(StorageKey::CloseDelay),
            3 => Some(StorageKey::StepsToClose),
            4 => Some(StorageKey::DoorOpen),
            _ => None,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying flash/EEPROM operation failed
    Flash,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Key-value store trait
///
/// Writes are synchronous: once `write` returns `Ok` the value is
/// considered durable. There is no batching and no retry.
pub trait KeyValueStore {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut buffer = [0u8; 8];
        !matches!(
            self.read(key, &mut buffer),
            Err(StorageError::NotFound)
        )
    }

    /// Erase all stored data
    fn erase_all(&mut self) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read(key, buffer)
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(key, data)
    }

    fn exists(&mut self, key: StorageKey) -> bool {
        (**self).exists(key)
    }

    fn erase_all(&mut self) -> Result<(), StorageError> {
        (**self).erase_all()
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ids_are_stable() {
        assert_eq!(StorageKey::Timezone.as_u8(), 0);
        assert_eq!(StorageKey::OpenDelay.as_u8(), 1);
        assert_eq!(StorageKey::CloseDelay.as_u8(), 2);
        assert_eq!(StorageKey::StepsToClose.as_u8(), 3);
        assert_eq!(StorageKey::DoorOpen.as_u8(), 4);
    }

    #[test]
    fn test_from_u8() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(5), None);
        assert_eq!(StorageKey::from_u8(0xFF), None);
    }

    struct EmptyStore;

    impl KeyValueStore for EmptyStore {
        fn read(&mut self, _key: StorageKey, _buffer: &mut [u8]) -> Result<usize, StorageError> {
            Err(StorageError::NotFound)
        }

        fn write(&mut self, _key: StorageKey, _data: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Full)
        }

        fn erase_all(&mut self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_exists_default_impl() {
        let mut store = EmptyStore;
        assert!(!store.exists(StorageKey::Timezone));

        fn probe<S: KeyValueStore>(mut store: S) -> (bool, Result<(), StorageError>) {
            (store.exists(StorageKey::DoorOpen), store.write(StorageKey::DoorOpen, &[1]))
        }

        assert_eq!(probe(&mut store), (false, Err(StorageError::Full)));
    }
}
