use super::{ResponseStore, StoreError};
use crate::downloader::{csv_row, header_row};
use crate::loader::from_csv;
use crate::response::Response;
use std::fs::{self, File, OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-backed store: a header row followed by one response per row
pub struct CsvStore {
    path: PathBuf,
    // Serialises appends and truncation across sessions
    lock: Mutex<()>,
}

impl CsvStore {
    /// Open the file, creating it (and its directory) with a header row if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }

        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if needs_header {
            let mut file = File::create(&path)?;
            file.write_all(header_row().as_bytes())?;
        }

        Ok(CsvStore {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResponseStore for CsvStore {
    fn insert(&self, response: &Response) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        if file.metadata()?.len() == 0 {
            file.write_all(header_row().as_bytes())?;
        }
        file.write_all(csv_row(response).as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<Response>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        from_csv(&content).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = File::create(&self.path)?;
        file.write_all(header_row().as_bytes())?;
        file.sync_data()?;
        Ok(())
    }
}
