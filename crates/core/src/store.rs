//! Shared state storage.
//!
//! The webhook server and the dashboard are separate processes that coordinate
//! only through this store. Every operation reads or rewrites the whole
//! document. Within one process, read-modify-write cycles on a store are
//! serialized; across processes concurrent writers are last-write-wins.
//! Files are replaced atomically so readers never observe a partial document.

use crate::types::{MessageRecord, Settings, StateDocument};
use crate::{Error, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Default state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "state.json";

/// Storage seam for the state document.
pub trait StateStore: Send + Sync {
    /// Load the document. Missing or unreadable state yields an empty document.
    fn read(&self) -> StateDocument;

    /// Replace the stored document.
    fn write(&self, doc: &StateDocument) -> Result<()>;

    /// Append one record to the end of `messages`.
    fn append(&self, record: MessageRecord) -> Result<()> {
        let mut doc = self.read();
        doc.messages.push(record);
        self.write(&doc)
    }

    /// Replace the settings object.
    fn update_settings(&self, settings: Settings) -> Result<()> {
        let mut doc = self.read();
        doc.settings = Some(settings);
        self.write(&doc)
    }
}

/// JSON file backed store. Clones share one write lock.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read, modify and write back while holding the lock.
    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut StateDocument),
    {
        let _guard = self.guard();
        let mut doc = self.read();
        f(&mut doc);
        self.replace(&doc)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
    }

    /// Write to a temporary sibling, then rename over the state file.
    fn replace(&self, doc: &StateDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = to_pretty_json(doc)?;
        let tmp_path = self.temp_path();
        let written = File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&raw)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::storage(format!(
                "failed to write state file {}: {}",
                self.path.display(),
                e
            )));
        }
        debug!(
            "wrote state file {} ({} messages)",
            self.path.display(),
            doc.messages.len()
        );
        Ok(())
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl StateStore for JsonFileStore {
    fn read(&self) -> StateDocument {
        if !self.path.exists() {
            return StateDocument::default();
        }
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("failed to read state file {}: {}", self.path.display(), err);
                return StateDocument::default();
            }
        };
        match serde_json::from_str::<StateDocument>(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(
                    "discarding unparseable state file {}: {}",
                    self.path.display(),
                    err
                );
                StateDocument::default()
            }
        }
    }

    fn write(&self, doc: &StateDocument) -> Result<()> {
        let _guard = self.guard();
        self.replace(doc)
    }

    fn append(&self, record: MessageRecord) -> Result<()> {
        self.modify(|doc| doc.messages.push(record))
    }

    fn update_settings(&self, settings: Settings) -> Result<()> {
        self.modify(|doc| doc.settings = Some(settings))
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
