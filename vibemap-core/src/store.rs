//! Persistence port: a string key-value store holding JSON documents.
//!
//! The session and review code only ever talk to [`KeyValueStore`], so any
//! backend (in-memory, files, browser storage) can sit behind it.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{Result, VibeError};

/// Cached user profile.
pub const USER_KEY: &str = "user";
/// Every review ever submitted, all venues.
pub const REVIEWS_KEY: &str = "reviews";

/// Comments users posted to one venue.
pub fn comments_key(venue_id: &str) -> String {
    format!("comments.{venue_id}")
}

/// Per-user "allow once" marker.
pub fn allow_once_key(user_id: &str) -> String {
    format!("allow_once.{user_id}")
}

pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Outcome of reading a JSON document that may be missing or corrupt.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Present(T),
    Absent,
    /// Stored bytes did not parse; carries the parser message.
    Malformed(String),
}

impl<T> Loaded<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Loaded::Present(v) => Some(v),
            _ => None,
        }
    }
}

pub fn load_json<T: DeserializeOwned, S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Loaded<T>> {
    let Some(raw) = store.load(key)? else {
        return Ok(Loaded::Absent);
    };
    Ok(match serde_json::from_str(&raw) {
        Ok(v) => Loaded::Present(v),
        Err(e) => Loaded::Malformed(e.to_string()),
    })
}

pub fn save_json<T: Serialize, S: KeyValueStore + ?Sized>(store: &mut S, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|e| VibeError::Store(format!("serialize {key}: {e}")))?;
    store.save(key, raw)
}

/// Process-local store; the default for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
