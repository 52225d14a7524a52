//! Repository for the project collection.

use serde_json::json;
use testmaster_core::error::CoreError;
use testmaster_core::status::ProjectStatus;
use testmaster_core::types;
use testmaster_core::validation::validate_project_name;
use testmaster_events::bus::{PROJECT_CREATED, PROJECT_DELETED, PROJECT_UPDATED};
use testmaster_events::ChangeEvent;

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::store::EntityStore;

/// Provides lifecycle operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Create a project in the `BACKLOG` column, newest first.
    ///
    /// The name is trimmed and must be non-empty; invalid input leaves the
    /// store untouched.
    pub fn create(store: &mut EntityStore, input: &CreateProject) -> Result<Project, CoreError> {
        let name = validate_project_name(&input.name)?;

        let project = Project {
            id: store.next_id(),
            name,
            description: input.description.trim().to_string(),
            category: input.category,
            status: ProjectStatus::Backlog,
            created_at: types::now(),
        };

        store.projects_mut().insert(0, project.clone());
        tracing::info!(id = %project.id, name = %project.name, "Project created");
        store.commit(ChangeEvent::new(PROJECT_CREATED, project.id.clone()));
        Ok(project)
    }

    pub fn find_by_id<'a>(store: &'a EntityStore, id: &str) -> Option<&'a Project> {
        store.projects().iter().find(|p| p.id == id)
    }

    /// All projects in display order (newest first).
    pub fn list(store: &EntityStore) -> &[Project] {
        store.projects()
    }

    /// The projects of one board column, in display order.
    pub fn list_by_status(store: &EntityStore, status: ProjectStatus) -> Vec<&Project> {
        store
            .projects()
            .iter()
            .filter(|p| p.status == status)
            .collect()
    }

    /// Update a project. Only supplied fields are applied.
    ///
    /// Returns `Ok(None)` if no project with the given `id` exists. A supplied
    /// name that is blank after trimming is rejected.
    pub fn update(
        store: &mut EntityStore,
        id: &str,
        input: &UpdateProject,
    ) -> Result<Option<Project>, CoreError> {
        let mut input = input.clone();
        if let Some(name) = &input.name {
            input.name = Some(validate_project_name(name)?);
        }

        let Some(project) = store.projects_mut().iter_mut().find(|p| p.id == id) else {
            tracing::debug!(id, "Project update ignored, not found");
            return Ok(None);
        };
        input.apply_to(project);
        let updated = project.clone();

        tracing::debug!(id, status = %updated.status.name(), "Project updated");
        store.commit(ChangeEvent::new(PROJECT_UPDATED, id));
        Ok(Some(updated))
    }

    /// Move a project to another board column (drag and drop).
    pub fn move_to(store: &mut EntityStore, id: &str, status: ProjectStatus) -> Option<Project> {
        // A status-only update carries no name, so validation cannot fail.
        Self::update(store, id, &UpdateProject::status(status))
            .ok()
            .flatten()
    }

    /// Delete a project and, in the same step, every task that belongs to it.
    ///
    /// Returns `true` if the project existed.
    pub fn delete(store: &mut EntityStore, id: &str) -> bool {
        let (projects, tasks) = store.collections_mut();

        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            tracing::debug!(id, "Project delete ignored, not found");
            return false;
        }

        let tasks_before = tasks.len();
        tasks.retain(|t| t.project_id != id);
        let removed_tasks = tasks_before - tasks.len();

        tracing::info!(id, removed_tasks, "Project deleted");
        store.commit(
            ChangeEvent::new(PROJECT_DELETED, id)
                .with_payload(json!({ "removed_tasks": removed_tasks })),
        );
        true
    }
}
