#![allow(dead_code)]

use checkin::admin::ClearGuard;
use checkin::dashboard::Dashboard;
use checkin::regions::RegionDirectory;
use checkin::response::{Response, ResponseForm};
use checkin::store::{MemoryStore, ResponseStore, StoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const LOCAL_REGION: &str = "District of Columbia";

pub fn alice_form() -> ResponseForm {
    ResponseForm {
        name: "Alice".to_string(),
        age: "30".to_string(),
        christian: "Yes".to_string(),
        faith: "No".to_string(),
        country: "United States".to_string(),
        state: "Virginia".to_string(),
        how_found_us: String::new(),
    }
}

pub fn form(name: &str, age: &str, country: &str, state: &str) -> ResponseForm {
    ResponseForm {
        name: name.to_string(),
        age: age.to_string(),
        christian: "Yes".to_string(),
        faith: "Yes".to_string(),
        country: country.to_string(),
        state: state.to_string(),
        how_found_us: String::new(),
    }
}

pub fn response(name: &str, age: i64, country: &str, state: &str) -> Response {
    form(name, &age.to_string(), country, state)
        .validate(LOCAL_REGION)
        .expect("test response should validate")
}

pub fn dashboard_with(store: Arc<dyn ResponseStore>) -> Dashboard {
    Dashboard::new(
        store,
        Arc::new(ClearGuard::new()),
        Arc::new(RegionDirectory::builtin()),
        LOCAL_REGION,
        20,
    )
}

pub fn memory_dashboard() -> (Arc<MemoryStore>, Dashboard) {
    let store = Arc::new(MemoryStore::new());
    let dashboard = dashboard_with(store.clone());
    (store, dashboard)
}

/// Memory store that counts every call
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub inserts: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl CountingStore {
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl ResponseStore for CountingStore {
    fn insert(&self, response: &Response) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(response)
    }

    fn scan_all(&self) -> Result<Vec<Response>, StoreError> {
        self.inner.scan_all()
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_all()
    }
}

/// Store whose writes always fail
#[derive(Default)]
pub struct FailingStore;

impl ResponseStore for FailingStore {
    fn insert(&self, _response: &Response) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn scan_all(&self) -> Result<Vec<Response>, StoreError> {
        Ok(Vec::new())
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}
