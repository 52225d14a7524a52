//! Key-value persistence surface and snapshot (de)serialization.
//!
//! The store keeps two independent keys, [`PROJECTS_KEY`] and [`TASKS_KEY`],
//! each holding a JSON array that is rewritten whole on every commit.

mod file;
mod memory;

use serde::de::DeserializeOwned;

use crate::models::project::Project;
use crate::models::task::Task;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized project collection.
pub const PROJECTS_KEY: &str = "projects";

/// Key holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

/// Errors raised by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// A string key-value surface (browser local storage, a directory, ...).
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Both collections as read from a backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

/// Read the persisted snapshot.
///
/// Fails open: a missing key, an unreadable backend or unparsable JSON yields
/// an empty collection for that key and a warning in the log.
pub fn load_snapshot(backend: &dyn KeyValueStore) -> Snapshot {
    Snapshot {
        projects: read_collection(backend, PROJECTS_KEY),
        tasks: read_collection(backend, TASKS_KEY),
    }
}

/// Write both collections.
///
/// Tasks are written first: if the second write fails after a cascade delete,
/// the backend holds a project without tasks rather than orphan tasks.
pub fn save_snapshot(
    backend: &dyn KeyValueStore,
    projects: &[Project],
    tasks: &[Task],
) -> Result<(), StoreError> {
    let tasks_json = serde_json::to_string(tasks)?;
    let projects_json = serde_json::to_string(projects)?;
    backend.set(TASKS_KEY, &tasks_json)?;
    backend.set(PROJECTS_KEY, &projects_json)?;
    Ok(())
}

fn read_collection<T: DeserializeOwned>(backend: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read persisted collection, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key, error = %e, "Persisted collection is corrupt, starting empty");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use testmaster_core::status::{ProjectStatus, TaskStatus, TestCategory};

    use crate::models::task::{TestImage, TestStep};

    fn sample_project() -> Project {
        Project {
            id: "p1".into(),
            name: "Checkout Flow".into(),
            description: "Cart to payment".into(),
            category: TestCategory::Functional,
            status: ProjectStatus::InProgress,
            created_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
        }
    }

    fn sample_task(id: &str, with_nested: bool) -> Task {
        Task {
            id: id.into(),
            project_id: "p1".into(),
            title: "Verify total price".into(),
            description: "Sum of items plus shipping".into(),
            steps: if with_nested {
                vec![TestStep {
                    id: "s1".into(),
                    description: "Add two items".into(),
                    completed: true,
                }]
            } else {
                vec![]
            },
            observations: String::new(),
            logs: if with_nested { "GET /cart 200".into() } else { String::new() },
            log_file_name: with_nested.then(|| "cart.txt".to_string()),
            images: if with_nested {
                vec![TestImage {
                    url: "data:image/png;base64,AAAA".into(),
                    description: "cart page".into(),
                }]
            } else {
                vec![]
            },
            status: TaskStatus::Nok,
            completed: true,
            created_at: Utc.timestamp_millis_opt(1_700_000_100_000).unwrap(),
        }
    }

    /// Backend whose reads always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("unavailable".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("unavailable".into()))
        }
    }

    #[test]
    fn round_trip_preserves_collections() {
        let backend = MemoryStore::new();
        let projects = vec![sample_project()];
        let tasks = vec![sample_task("t1", true), sample_task("t2", false)];

        save_snapshot(&backend, &projects, &tasks).unwrap();
        let loaded = load_snapshot(&backend);

        assert_eq!(loaded.projects, projects);
        assert_eq!(loaded.tasks, tasks);
    }

    #[test]
    fn round_trip_empty_collections() {
        let backend = MemoryStore::new();
        save_snapshot(&backend, &[], &[]).unwrap();
        assert_eq!(backend.get(PROJECTS_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(load_snapshot(&backend), Snapshot::default());
    }

    #[test]
    fn absent_keys_load_empty() {
        assert_eq!(load_snapshot(&MemoryStore::new()), Snapshot::default());
    }

    #[test]
    fn corrupt_key_loads_empty_without_touching_the_other() {
        let backend = MemoryStore::new();
        save_snapshot(&backend, &[sample_project()], &[]).unwrap();
        backend.set(TASKS_KEY, "{not json").unwrap();

        let loaded = load_snapshot(&backend);
        assert_eq!(loaded.projects.len(), 1);
        assert!(loaded.tasks.is_empty());
    }

    #[test]
    fn unreadable_backend_loads_empty() {
        assert_eq!(load_snapshot(&BrokenStore), Snapshot::default());
    }

    #[test]
    fn save_surfaces_backend_errors() {
        let err = save_snapshot(&BrokenStore, &[], &[]).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn loads_snapshot_written_by_the_browser_tool() {
        let backend = MemoryStore::new();
        backend
            .set(
                PROJECTS_KEY,
                r#"[{"id":"8f1c","name":"Login","description":"","category":"SANITY","status":"DONE","createdAt":1718000000000}]"#,
            )
            .unwrap();
        backend
            .set(
                TASKS_KEY,
                r#"[{"id":"a1","projectId":"8f1c","title":"Novo","description":"","steps":[],"observations":"","logs":"","images":[],"status":"PENDING","completed":false,"createdAt":1718000000500}]"#,
            )
            .unwrap();

        let loaded = load_snapshot(&backend);
        assert_eq!(loaded.projects[0].category, TestCategory::Sanity);
        assert_eq!(loaded.projects[0].status, ProjectStatus::Done);
        assert_eq!(loaded.tasks[0].project_id, "8f1c");
    }
}
