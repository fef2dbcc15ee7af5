//! Identity of the customer being verified.
//!
//! The signup step leaves the customer's email in a persisted key-value
//! store; the verification flow reads it once when it starts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::domain::value_objects::Email;

pub const USER_EMAIL_KEY: &str = "userEmail";
pub const PLACEHOLDER_EMAIL: &str = "velore@user.com";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is not a JSON object of strings: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten whole on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut entries);
        std::fs::write(&self.path, serde_json::to_string_pretty(&*entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| { entries.insert(key.to_string(), value.to_string()); })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| { entries.remove(key); })
    }
}

pub trait IdentityProvider {
    fn email(&self) -> Email;
}

/// Email captured from the store at construction time.
#[derive(Debug, Clone)]
pub struct StoredIdentity {
    email: Email,
}

impl StoredIdentity {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let email = match store.get(USER_EMAIL_KEY).map(Email::new) {
            Some(Ok(email)) => email,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "stored email unusable, using placeholder");
                placeholder()
            }
            None => {
                tracing::warn!("no stored email, using placeholder");
                placeholder()
            }
        };
        Self { email }
    }
}

impl IdentityProvider for StoredIdentity {
    fn email(&self) -> Email { self.email.clone() }
}

/// Fixed identity, handy for hosts that already know the email.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub Email);

impl IdentityProvider for StaticIdentity {
    fn email(&self) -> Email { self.0.clone() }
}

fn placeholder() -> Email { Email::trusted(PLACEHOLDER_EMAIL) }
