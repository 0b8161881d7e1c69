//! Response storage
//!
//! Every read and write of attendee rows goes through [`ResponseStore`], so
//! the persisted data is the only copy the application consults.

mod csv;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use csv::CsvStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::config::{Config, StoreBackend};
use crate::response::Response;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only table of responses
///
/// Each call is atomic with respect to other calls on the same store.
pub trait ResponseStore: Send + Sync {
    fn insert(&self, response: &Response) -> Result<(), StoreError>;

    /// All rows in insertion order
    fn scan_all(&self) -> Result<Vec<Response>, StoreError>;

    fn delete_all(&self) -> Result<(), StoreError>;
}

/// Open the backend selected by the configuration
pub fn open(config: &Config) -> Result<Arc<dyn ResponseStore>, StoreError> {
    let store: Arc<dyn ResponseStore> = match config.store {
        StoreBackend::Csv => Arc::new(CsvStore::open(&config.store_path)?),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.store_path)?),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => {
            return Err(StoreError::Unavailable(
                "SQLite support requires the 'sqlite' feature".to_string(),
            ));
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    log::info!(
        "Using {:?} response store at {}",
        config.store,
        config.store_path.display()
    );
    Ok(store)
}
