//! The entity store: sole owner of the project and task collections.

use std::sync::Arc;

use testmaster_core::config::AppConfig;
use testmaster_core::types::EntityId;
use testmaster_events::{ChangeEvent, EventBus};

use crate::ids::{IdGenerator, UuidGenerator};
use crate::models::project::Project;
use crate::models::task::Task;
use crate::persistence::{self, FileStore, KeyValueStore, StoreError};

/// In-memory collections plus the backend they are persisted to.
///
/// Only the repositories mutate the collections. Each mutation ends with a
/// single [`commit`](Self::commit), so every intermediate state (for example a
/// project removed while its tasks still exist) is unobservable.
pub struct EntityStore {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    backend: Arc<dyn KeyValueStore>,
    ids: Box<dyn IdGenerator>,
    bus: Option<Arc<EventBus>>,
    dirty: bool,
}

impl EntityStore {
    /// Load the persisted snapshot from `backend`.
    ///
    /// Never fails: unreadable or corrupt data starts the store empty.
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let snapshot = persistence::load_snapshot(backend.as_ref());
        tracing::info!(
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            "Entity store loaded"
        );
        Self {
            projects: snapshot.projects,
            tasks: snapshot.tasks,
            backend,
            ids: Box::new(UuidGenerator),
            bus: None,
            dirty: false,
        }
    }

    /// Open the file-backed store in the configured data directory.
    pub fn open(config: &AppConfig) -> Self {
        Self::load(Arc::new(FileStore::new(&config.data_dir)))
    }

    /// Replace the id generator (deterministic ids in tests).
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Publish a [`ChangeEvent`] on `bus` after every commit.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// `true` when the last commit failed to persist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist the current collections now.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let result = persistence::save_snapshot(self.backend.as_ref(), &self.projects, &self.tasks);
        self.dirty = result.is_err();
        result
    }

    // -----------------------------------------------------------------------
    // Crate-internal mutation surface (used by the repositories)
    // -----------------------------------------------------------------------

    pub(crate) fn next_id(&self) -> EntityId {
        self.ids.new_id()
    }

    pub(crate) fn projects_mut(&mut self) -> &mut Vec<Project> {
        &mut self.projects
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }

    /// Both collections at once, for cascading mutations.
    pub(crate) fn collections_mut(&mut self) -> (&mut Vec<Project>, &mut Vec<Task>) {
        (&mut self.projects, &mut self.tasks)
    }

    /// Persist the snapshot and announce `event`.
    ///
    /// A failed save is logged and leaves the store dirty; the next commit
    /// writes the full snapshot again.
    pub(crate) fn commit(&mut self, event: ChangeEvent) {
        if let Err(e) = self.flush() {
            tracing::warn!(
                error = %e,
                event_type = %event.event_type,
                "Failed to persist snapshot, will retry on next mutation"
            );
        }
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("projects", &self.projects.len())
            .field("tasks", &self.tasks.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
