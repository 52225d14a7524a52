//! Shared fixtures for the entity store integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use testmaster_core::status::TestCategory;
use testmaster_db::ids::SequentialIds;
use testmaster_db::models::project::{CreateProject, Project};
use testmaster_db::{EntityStore, KeyValueStore, MemoryStore, StoreError};

/// A store over an in-memory backend with deterministic ids.
pub fn memory_store() -> EntityStore {
    EntityStore::load(Arc::new(MemoryStore::new())).with_id_generator(SequentialIds::default())
}

pub fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: String::new(),
        category: TestCategory::Functional,
    }
}

pub fn create_project(store: &mut EntityStore, name: &str) -> Project {
    testmaster_db::repositories::ProjectRepo::create(store, &new_project(name))
        .expect("project creation should succeed")
}

/// Backend whose writes can be switched to fail, counting every attempt.
#[derive(Debug, Default)]
pub struct FlakyStore {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("quota exceeded".into()));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
