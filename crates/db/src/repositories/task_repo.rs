//! Repository for the task collection.
//!
//! Nested sequences (`steps`, `images`) are never edited in place: each
//! operation builds a new `Vec` and assigns it to the task.

use serde_json::json;
use testmaster_core::error::CoreError;
use testmaster_core::status::TaskStatus;
use testmaster_core::types::{self, EntityId};
use testmaster_core::validation::validate_image_url;
use testmaster_events::bus::{TASKS_CLEARED, TASK_CREATED, TASK_DELETED, TASK_UPDATED};
use testmaster_events::ChangeEvent;

use crate::models::task::{StatusCounts, Task, TestImage, TestStep, UpdateStep, UpdateTask};
use crate::repositories::ProjectRepo;
use crate::store::EntityStore;

/// Provides lifecycle operations for tasks and their nested steps and images.
pub struct TaskRepo;

impl TaskRepo {
    // -----------------------------------------------------------------------
    // Create / read
    // -----------------------------------------------------------------------

    /// Create an empty `PENDING` task in `project_id`, newest first.
    pub fn create(store: &mut EntityStore, project_id: &str) -> Result<Task, CoreError> {
        if ProjectRepo::find_by_id(store, project_id).is_none() {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id.to_string(),
            });
        }

        let task = Task {
            id: store.next_id(),
            project_id: project_id.to_string(),
            title: String::new(),
            description: String::new(),
            steps: Vec::new(),
            observations: String::new(),
            logs: String::new(),
            log_file_name: None,
            images: Vec::new(),
            status: TaskStatus::Pending,
            completed: false,
            created_at: types::now(),
        };

        store.tasks_mut().insert(0, task.clone());
        tracing::info!(id = %task.id, project_id, "Task created");
        store.commit(ChangeEvent::new(TASK_CREATED, task.id.clone()));
        Ok(task)
    }

    pub fn find_by_id<'a>(store: &'a EntityStore, id: &str) -> Option<&'a Task> {
        store.tasks().iter().find(|t| t.id == id)
    }

    /// Tasks of one project in display order.
    pub fn list_by_project<'a>(store: &'a EntityStore, project_id: &str) -> Vec<&'a Task> {
        crate::filter::tasks_for_project(store.tasks(), project_id)
    }

    /// Status tally for one project's tasks (board cards, project header).
    pub fn stats_for_project(store: &EntityStore, project_id: &str) -> StatusCounts {
        StatusCounts::from_tasks(Self::list_by_project(store, project_id))
    }

    // -----------------------------------------------------------------------
    // Update / delete
    // -----------------------------------------------------------------------

    /// Update a task. Only supplied fields are applied.
    ///
    /// Returns `None` if no task with the given `id` exists.
    pub fn update(store: &mut EntityStore, id: &str, input: &UpdateTask) -> Option<Task> {
        Self::modify(store, id, |task| {
            input.apply_to(task);
            true
        })
    }

    /// Replace only the title.
    pub fn rename(store: &mut EntityStore, id: &str, title: &str) -> Option<Task> {
        Self::update(store, id, &UpdateTask::title(title))
    }

    /// Returns `true` if the task existed.
    pub fn delete(store: &mut EntityStore, id: &str) -> bool {
        let tasks = store.tasks_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            tracing::debug!(id, "Task delete ignored, not found");
            return false;
        }

        tracing::info!(id, "Task deleted");
        store.commit(ChangeEvent::new(TASK_DELETED, id));
        true
    }

    /// Remove every task of a project while keeping the project.
    ///
    /// Returns the number of tasks removed.
    pub fn delete_by_project(store: &mut EntityStore, project_id: &str) -> usize {
        let tasks = store.tasks_mut();
        let before = tasks.len();
        tasks.retain(|t| t.project_id != project_id);
        let removed = before - tasks.len();
        if removed == 0 {
            tracing::debug!(project_id, "No tasks to clear");
            return 0;
        }

        tracing::info!(project_id, removed, "Project tasks cleared");
        store.commit(
            ChangeEvent::new(TASKS_CLEARED, project_id)
                .with_payload(json!({ "removed_tasks": removed })),
        );
        removed
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Select `target`: re-selecting the active status returns the task to
    /// `PENDING`, anything else overwrites the current status.
    pub fn set_status(store: &mut EntityStore, id: &str, target: TaskStatus) -> Option<Task> {
        Self::modify(store, id, |task| {
            task.status = task.status.toggled(target);
            true
        })
    }

    pub fn reset_status(store: &mut EntityStore, id: &str) -> Option<Task> {
        Self::update(store, id, &UpdateTask::status(TaskStatus::Pending))
    }

    /// Flip the "checked off" flag. Leaves `status` alone.
    pub fn toggle_completed(store: &mut EntityStore, id: &str) -> Option<Task> {
        Self::modify(store, id, |task| {
            task.completed = !task.completed;
            true
        })
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Append an empty, unchecked step. Returns the new step.
    pub fn add_step(store: &mut EntityStore, task_id: &str) -> Option<TestStep> {
        let step = TestStep {
            id: store.next_id(),
            description: String::new(),
            completed: false,
        };
        let appended = step.clone();
        Self::modify(store, task_id, move |task| {
            let mut steps = task.steps.clone();
            steps.push(appended);
            task.steps = steps;
            true
        })?;
        Some(step)
    }

    /// Edit one step. `None` if the task or step does not exist.
    pub fn update_step(
        store: &mut EntityStore,
        task_id: &str,
        step_id: &str,
        input: &UpdateStep,
    ) -> Option<Task> {
        Self::map_step(store, task_id, step_id, |step| {
            if let Some(description) = &input.description {
                step.description = description.clone();
            }
            if let Some(completed) = input.completed {
                step.completed = completed;
            }
        })
    }

    pub fn toggle_step(store: &mut EntityStore, task_id: &str, step_id: &str) -> Option<Task> {
        Self::map_step(store, task_id, step_id, |step| {
            step.completed = !step.completed;
        })
    }

    pub fn remove_step(store: &mut EntityStore, task_id: &str, step_id: &str) -> Option<Task> {
        Self::modify(store, task_id, |task| {
            if !task.steps.iter().any(|s| s.id == step_id) {
                return false;
            }
            task.steps = task
                .steps
                .iter()
                .filter(|s| s.id != step_id)
                .cloned()
                .collect();
            true
        })
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Append an image to the gallery.
    ///
    /// Always merges against the task as it is now, so several ingestions that
    /// complete out of order all land.
    pub fn add_image(
        store: &mut EntityStore,
        task_id: &str,
        url: &str,
        description: &str,
    ) -> Result<Task, CoreError> {
        validate_image_url(url)?;
        let image = TestImage {
            url: url.to_string(),
            description: description.to_string(),
        };
        Self::modify(store, task_id, move |task| {
            let mut images = task.images.clone();
            images.push(image);
            task.images = images;
            true
        })
        .ok_or_else(|| CoreError::NotFound {
            entity: "Task",
            id: task_id.to_string(),
        })
    }

    /// Remove the image at `index`. `None` if the task or index does not exist.
    pub fn remove_image(store: &mut EntityStore, task_id: &str, index: usize) -> Option<Task> {
        Self::modify(store, task_id, |task| {
            if index >= task.images.len() {
                return false;
            }
            task.images = task
                .images
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, img)| img.clone())
                .collect();
            true
        })
    }

    pub fn set_image_description(
        store: &mut EntityStore,
        task_id: &str,
        index: usize,
        text: &str,
    ) -> Option<Task> {
        Self::modify(store, task_id, |task| {
            if index >= task.images.len() {
                return false;
            }
            let mut images = task.images.clone();
            images[index].description = text.to_string();
            task.images = images;
            true
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Apply `change` to the task with `id` and commit.
    ///
    /// `change` returns `false` to signal a no-op (e.g. unknown step id), in
    /// which case nothing is committed and `None` is returned.
    fn modify<F>(store: &mut EntityStore, id: &str, change: F) -> Option<Task>
    where
        F: FnOnce(&mut Task) -> bool,
    {
        let Some(task) = store.tasks_mut().iter_mut().find(|t| t.id == id) else {
            tracing::debug!(id, "Task mutation ignored, not found");
            return None;
        };
        if !change(task) {
            tracing::debug!(id, "Task mutation ignored, target element not found");
            return None;
        }
        let updated = task.clone();

        tracing::debug!(id, status = %updated.status, "Task updated");
        store.commit(ChangeEvent::new(TASK_UPDATED, EntityId::from(id)));
        Some(updated)
    }

    /// Rebuild the step list with `change` applied to the step with `step_id`.
    fn map_step<F>(store: &mut EntityStore, task_id: &str, step_id: &str, change: F) -> Option<Task>
    where
        F: FnOnce(&mut TestStep),
    {
        Self::modify(store, task_id, |task| {
            let Some(pos) = task.steps.iter().position(|s| s.id == step_id) else {
                return false;
            };
            let mut steps = task.steps.clone();
            change(&mut steps[pos]);
            task.steps = steps;
            true
        })
    }
}
