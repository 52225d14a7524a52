//! Task (test scenario) entity model and DTOs.

use serde::{Deserialize, Serialize};
use testmaster_core::status::TaskStatus;
use testmaster_core::types::{EntityId, Timestamp};

/// One checklist item of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub id: EntityId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A screenshot attached as evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestImage {
    /// `data:` URI or blob reference.
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// A test scenario belonging to exactly one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub project_id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<TestStep>,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub logs: String,
    /// Name for the exported full-text log file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_name: Option<String>,
    #[serde(default)]
    pub images: Vec<TestImage>,
    #[serde(default)]
    pub status: TaskStatus,
    /// "Checked off" in the scenario list. Independent of `status`.
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: Timestamp,
}

impl Task {
    /// Number of steps marked completed.
    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }

    pub fn has_logs(&self) -> bool {
        !self.logs.is_empty()
    }
}

/// DTO for updating an existing task. All fields are optional.
///
/// `steps` and `images` replace the whole sequence when supplied.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub observations: Option<String>,
    pub logs: Option<String>,
    /// `Some(None)` clears the custom log file name.
    pub log_file_name: Option<Option<String>>,
    pub steps: Option<Vec<TestStep>>,
    pub images: Option<Vec<TestImage>>,
    pub status: Option<TaskStatus>,
    pub completed: Option<bool>,
}

impl UpdateTask {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merge the supplied fields into `task`.
    pub(crate) fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(observations) = &self.observations {
            task.observations = observations.clone();
        }
        if let Some(logs) = &self.logs {
            task.logs = logs.clone();
        }
        if let Some(log_file_name) = &self.log_file_name {
            task.log_file_name = log_file_name.clone();
        }
        if let Some(steps) = &self.steps {
            task.steps = steps.clone();
        }
        if let Some(images) = &self.images {
            task.images = images.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// DTO for editing one step in place.
#[derive(Debug, Clone, Default)]
pub struct UpdateStep {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Per-status tally of a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub ok: usize,
    pub nok: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            counts.total += 1;
            match task.status {
                TaskStatus::Ok => counts.ok += 1,
                TaskStatus::Nok => counts.nok += 1,
                TaskStatus::Pending => counts.pending += 1,
            }
            counts
        })
    }
}
