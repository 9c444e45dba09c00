// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent key-value storage bridge.
//!
//! Every value is stored as a JSON string under a fixed key. Reads never
//! fail: a missing or malformed value is logged and treated as absent.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{SavedDate, Session};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Storage keys as constants.
pub mod keys {
    /// Authenticated session bundle
    pub const AUTH: &str = "beachcheck_auth";
    /// Favorite beach ids of a signed-out user
    pub const FAVORITES: &str = "beachcheck_favorites";
    /// Saved reservations, in creation order
    pub const SAVED_DATES: &str = "beachcheck_saved_dates";
    /// Theme preference
    pub const THEME: &str = "beachcheck_theme";

    /// Last verification-email resend (epoch ms) for one address.
    pub fn resend_stamp(email: &str) -> String {
        format!("email_resend_{}", email)
    }
}

/// A string key-value store (browser local storage, a file, memory).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Errors from storage writes.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write storage: {0}")]
    Io(String),

    #[error("Failed to encode value for {0}: {1}")]
    Encode(String, String),
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the operating system
    System,
}

/// Typed access to the persisted client state.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Volatile storage, used by tests and one-shot runs.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// Storage backed by a JSON file at `path`.
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Ok(Self::new(Arc::new(FileStore::open(path)?)))
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.backend.get(key)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }

    /// Load and decode a JSON value, treating malformed data as absent.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed stored value");
                None
            }
        }
    }

    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| StorageError::Encode(key.to_string(), e.to_string()))?;
        self.backend.set(key, &encoded)
    }

    // ─── Session ─────────────────────────────────────────────────────────────

    /// Persisted session, if present and carrying a token and user.
    pub fn load_session(&self) -> Option<Session> {
        self.load_json::<Session>(keys::AUTH)
            .filter(Session::is_usable)
    }

    pub fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        self.save_json(keys::AUTH, session)
    }

    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.remove(keys::AUTH)
    }

    // ─── Favorites ───────────────────────────────────────────────────────────

    /// Locally stored favorite ids. Anything other than a JSON array is
    /// treated as empty; non-string elements are stringified.
    pub fn load_favorite_ids(&self) -> Vec<String> {
        match self.load_json::<serde_json::Value>(keys::FAVORITES) {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn save_favorite_ids(&self, ids: &[String]) -> Result<(), StorageError> {
        self.save_json(keys::FAVORITES, &ids)
    }

    // ─── Saved reservations ──────────────────────────────────────────────────

    pub fn load_saved_dates(&self) -> Vec<SavedDate> {
        self.load_json(keys::SAVED_DATES).unwrap_or_default()
    }

    pub fn save_saved_dates(&self, dates: &[SavedDate]) -> Result<(), StorageError> {
        self.save_json(keys::SAVED_DATES, &dates)
    }

    // ─── Theme ───────────────────────────────────────────────────────────────

    /// Stored theme. Written both bare and JSON-quoted in the wild, so both
    /// `dark` and `"dark"` are accepted.
    pub fn load_theme(&self) -> Theme {
        let Some(raw) = self.backend.get(keys::THEME) else {
            return Theme::default();
        };
        let bare = raw.trim().trim_matches('"');
        serde_json::from_value(serde_json::Value::String(bare.to_string())).unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.save_json(keys::THEME, &theme)
    }
}
