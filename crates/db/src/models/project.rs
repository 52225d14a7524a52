//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use testmaster_core::status::{ProjectStatus, TestCategory};
use testmaster_core::types::{EntityId, Timestamp};

/// A test suite shown as a card on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: TestCategory,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Default)]
pub struct CreateProject {
    pub name: String,
    pub description: String,
    pub category: TestCategory,
}

/// DTO for updating an existing project. All fields are optional.
///
/// `id` and `created_at` are deliberately absent: they never change.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<TestCategory>,
    pub status: Option<ProjectStatus>,
}

impl UpdateProject {
    /// An update that only moves the project to another board column.
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merge the supplied fields into `project`.
    pub(crate) fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(category) = self.category {
            project.category = category;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
    }
}
