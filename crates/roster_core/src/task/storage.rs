//! Client-local key/value storage for the task list.
//!
//! # Responsibility
//! - Abstract the client's key/value store behind `LocalStorage`.
//! - Persist the whole task array as JSON under one key.
//!
//! # Invariants
//! - Every save rewrites the full array; there are no partial updates.
//! - A missing key loads as an empty list.
//! - File writes go through a temp file and rename, so a crash never leaves
//!   a half-written array behind.

use crate::model::task::TaskRecord;
use crate::task::list::TaskList;
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key under which the task array is stored.
pub const TASKS_STORAGE_KEY: &str = "tasks";

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidKey(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "local storage io failed: {err}"),
            Self::Json(err) => write!(f, "local storage value is not valid task JSON: {err}"),
            Self::InvalidKey(key) => write!(
                f,
                "invalid storage key `{key}`; expected ASCII letters, digits, `_` or `-`"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// String key/value store owned by the client.
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// Volatile store, for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStorage {
    items: HashMap<String, String>,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileLocalStorage {
    dir: PathBuf,
}

impl FileLocalStorage {
    /// Uses `dir`, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// Loads the task list stored under [`TASKS_STORAGE_KEY`].
pub fn load_tasks(storage: &impl LocalStorage) -> StorageResult<TaskList> {
    let Some(raw) = storage.get_item(TASKS_STORAGE_KEY)? else {
        return Ok(TaskList::new());
    };

    match serde_json::from_str::<Vec<TaskRecord>>(&raw) {
        Ok(records) => {
            info!(
                "event=tasks_load module=task status=ok count={}",
                records.len()
            );
            Ok(TaskList::from_records(records))
        }
        Err(err) => {
            error!("event=tasks_load module=task status=error error_code=invalid_json error={err}");
            Err(err.into())
        }
    }
}

/// Rewrites the full task array under [`TASKS_STORAGE_KEY`].
pub fn save_tasks(storage: &mut impl LocalStorage, list: &TaskList) -> StorageResult<()> {
    let raw = serde_json::to_string(list.records())?;
    storage.set_item(TASKS_STORAGE_KEY, &raw)?;
    info!(
        "event=tasks_save module=task status=ok count={}",
        list.len()
    );
    Ok(())
}
