use super::{ResponseStore, StoreError};
use crate::response::Response;
use std::sync::RwLock;

/// Volatile store, lost on restart
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Response>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for MemoryStore {
    fn insert(&self, response: &Response) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        rows.push(response.clone());
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<Response>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(rows.clone())
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        rows.clear();
        Ok(())
    }
}
