use crate::error::DbError;
use crate::event_repo::STORED_EVENTS;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// JSON document database kept in a single file.
///
/// The document is one object whose keys are resource names. Every
/// read-modify-write cycle holds the store lock, so appends from concurrent
/// requests are never lost. A missing file reads as an empty database.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Map<String, Value>, DbError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    /// Applies `f` to the document and writes it back if `f` succeeds.
    pub fn update<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<T, DbError>,
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut db = self.load()?;
        let output = f(&mut db)?;
        self.save(&db)?;
        Ok(output)
    }

    /// Writes an empty database. Returns `false` when a file already exists
    /// and `force` is not set.
    pub fn init(&self, force: bool) -> Result<bool, DbError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() && !force {
            return Ok(false);
        }
        let mut db = Map::new();
        db.insert(STORED_EVENTS.to_string(), Value::Array(Vec::new()));
        self.save(&db)?;
        Ok(true)
    }

    fn load(&self) -> Result<Map<String, Value>, DbError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(Value::Object(db)) => Ok(db),
            Ok(_) => Err(DbError::Decode {
                message: format!("{} is not a JSON object", self.path.display()),
            }),
            Err(err) => Err(DbError::Decode {
                message: err.to_string(),
            }),
        }
    }

    fn save(&self, db: &Map<String, Value>) -> Result<(), DbError> {
        let mut text = serde_json::to_string_pretty(db).map_err(|err| DbError::Encode {
            message: err.to_string(),
        })?;
        text.push('\n');
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.staging_path();
        fs::write(&staging, text)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
