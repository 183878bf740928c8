//! Preference storage backends.
//!
//! The preference is one bare language code under a fixed key. Reads of a
//! missing or unreadable value are "no preference"; writes report failure so
//! callers can log it.

use crate::resolver::PreferenceStore;
use std::sync::Mutex;
use thiserror::Error;

/// Key the preferred language is stored under.
pub const PREFERENCE_KEY: &str = "preferred-language";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("preference storage is unavailable")]
    Unavailable,
}

/// In-process store holding a single value.
///
/// Last write wins; there is no expiry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(code: &str) -> Self {
        Self::from_option(Some(code.to_string()))
    }

    pub fn from_option(value: Option<String>) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // The slot holds plain data, so a poisoned lock is still usable.
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.slot().clone()
    }

    fn save(&self, code: &str) -> Result<(), StorageError> {
        *self.slot() = Some(code.to_string());
        Ok(())
    }
}

/// Storage that is disabled or missing (e.g., blocked by the browser).
///
/// Nothing is ever stored, so resolution behaves as if no preference exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl PreferenceStore for UnavailableStore {
    fn load(&self) -> Option<String> {
        None
    }

    fn save(&self, _code: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}
