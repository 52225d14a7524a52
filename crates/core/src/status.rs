//! Status and category enums shared by projects, tasks and reports.
//!
//! The serialized names (`"BACKLOG"`, `"NOK"`, ...) are the values stored in
//! persisted snapshots and must not change.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Execution outcome of a test task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not yet executed, or reset.
    #[default]
    Pending,
    /// The scenario passed.
    Ok,
    /// The scenario failed.
    Nok,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::Ok, Self::Nok];

    /// Persisted name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ok => "OK",
            Self::Nok => "NOK",
        }
    }

    /// Parse from the persisted name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::Validation(format!("Unknown task status '{name}'")))
    }

    /// Badge text used in reports.
    pub fn badge(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ok => "Passed",
            Self::Nok => "Failed",
        }
    }

    /// The status that results from selecting `target` while `self` is active.
    ///
    /// Re-selecting the active status toggles back to `Pending`; any other
    /// selection overwrites the current value.
    pub fn toggled(self, target: TaskStatus) -> TaskStatus {
        if self == target {
            TaskStatus::Pending
        } else {
            target
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Project status (kanban column)
// ---------------------------------------------------------------------------

/// Board column a project sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Backlog,
    InProgress,
    Done,
    Archived,
}

impl ProjectStatus {
    /// Board columns in display order.
    pub const COLUMNS: [ProjectStatus; 4] =
        [Self::Backlog, Self::InProgress, Self::Done, Self::Archived];

    pub fn name(self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Archived => "ARCHIVED",
        }
    }

    /// Column heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Planned",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Archived => "Archived",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::COLUMNS
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::Validation(format!("Unknown project status '{name}'")))
    }
}

// ---------------------------------------------------------------------------
// Test category
// ---------------------------------------------------------------------------

/// Kind of test suite. Descriptive only; it never changes behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestCategory {
    #[default]
    Functional,
    NonFunctional,
    Regression,
    Sanity,
    Confirmation,
}

impl TestCategory {
    pub const ALL: [TestCategory; 5] = [
        Self::Functional,
        Self::NonFunctional,
        Self::Regression,
        Self::Sanity,
        Self::Confirmation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Functional => "FUNCTIONAL",
            Self::NonFunctional => "NON_FUNCTIONAL",
            Self::Regression => "REGRESSION",
            Self::Sanity => "SANITY",
            Self::Confirmation => "CONFIRMATION",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Functional => "Functional",
            Self::NonFunctional => "Non-Functional",
            Self::Regression => "Regression",
            Self::Sanity => "Sanity",
            Self::Confirmation => "Confirmation",
        }
    }

    /// One-line explanation shown in the category picker.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Functional => "Validates requirements and business rules.",
            Self::NonFunctional => "Performance, security and usability.",
            Self::Regression => "Ensures nothing broke after changes.",
            Self::Sanity => "Quick stability check of a build.",
            Self::Confirmation => "Verifies a specific bug fix.",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::Validation(format!("Unknown test category '{name}'")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
