//! Local persistence for the two collections (forms, responses).
//!
//! The store is deliberately localStorage-shaped: each collection lives as
//! one serialized JSON blob under a fixed string key. Loads degrade
//! silently (missing key or corrupt blob both yield an empty collection,
//! the latter with a logged fault); saves overwrite the whole blob and
//! surface write failures to the caller.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use shared::domain::{Form, FormResponse};

pub const FORMS_KEY: &str = "formdesk.forms";
pub const RESPONSES_KEY: &str = "formdesk.responses";

/// The persistence seam: a string-keyed blob store.
pub trait KeyValueStore {
    /// Returns the stored blob, or `None` when the key has never been
    /// written (or the entry is unreadable; the fault is logged).
    fn get_string(&self, key: &str) -> Option<String>;

    /// Overwrites the blob under `key`. Errors are surfaced so callers can
    /// warn the user; the store makes no durability promise beyond `Ok`.
    fn set_string(&mut self, key: &str, value: String) -> Result<()>;
}

/// Production store: one file per key under a root directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::error!(key, path = %path.display(), error = %err, "failed to read store entry");
                None
            }
        }
    }

    fn set_string(&mut self, key: &str, value: String) -> Result<()> {
        let path = self.entry_path(key);
        fs::write(&path, value)
            .with_context(|| format!("failed to write store entry {}", path.display()))
    }
}

/// In-memory store for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Collection-level adapter over a [`KeyValueStore`].
#[derive(Debug)]
pub struct FormStore<S> {
    store: S,
}

impl<S: KeyValueStore> FormStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load_forms(&self) -> Vec<Form> {
        self.load_collection(FORMS_KEY)
    }

    pub fn save_forms(&mut self, forms: &[Form]) -> Result<()> {
        self.save_collection(FORMS_KEY, forms)
    }

    pub fn load_responses(&self) -> Vec<FormResponse> {
        self.load_collection(RESPONSES_KEY)
    }

    pub fn save_responses(&mut self, responses: &[FormResponse]) -> Result<()> {
        self.save_collection(RESPONSES_KEY, responses)
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.store.get_string(key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                // The blob is left in place untouched; the session simply
                // starts from an empty collection.
                tracing::error!(key, error = %err, "corrupt store entry, treating collection as empty");
                Vec::new()
            }
        }
    }

    fn save_collection<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)
            .with_context(|| format!("failed to serialize collection {key}"))?;
        self.store.set_string(key, raw)
    }
}

/// Finds a form by id within an in-memory collection.
pub fn get_form_by_id<'a>(form_id: &str, forms: &'a [Form]) -> Option<&'a Form> {
    forms.iter().find(|form| form.id == form_id)
}

/// Responses belonging to `form_id`, preserving submission order.
pub fn get_responses_by_form_id<'a>(
    form_id: &str,
    responses: &'a [FormResponse],
) -> Vec<&'a FormResponse> {
    responses
        .iter()
        .filter(|response| response.form_id == form_id)
        .collect()
}

/// Generates an opaque identifier from a time component and a random
/// component. Collision-resistant enough for a single-user, single-device
/// store; no formal uniqueness guarantee.
pub fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{millis:x}-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
