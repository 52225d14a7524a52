//! Read-only queries used by the scenario list and board views.
//!
//! Every function accepts anything that iterates `&Task` (a slice, a `Vec`, or
//! the output of another filter) so the three can be chained.

use testmaster_core::error::CoreError;
use testmaster_core::search::matches_any;
use testmaster_core::status::TaskStatus;

use crate::models::task::Task;

/// Status selector of the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// Parse `"ALL"` or a task status name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        if name.eq_ignore_ascii_case("ALL") {
            Ok(Self::All)
        } else {
            TaskStatus::from_name(name).map(Self::Only)
        }
    }

    pub fn accepts(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl From<TaskStatus> for StatusFilter {
    fn from(status: TaskStatus) -> Self {
        Self::Only(status)
    }
}

/// Tasks whose `project_id` equals `project_id`, order preserved.
pub fn tasks_for_project<'a, I>(tasks: I, project_id: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| t.project_id == project_id)
        .collect()
}

pub fn filter_by_status<'a, I>(tasks: I, filter: StatusFilter) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| filter.accepts(t.status))
        .collect()
}

/// Case-insensitive substring search over title and description.
pub fn search_by_text<'a, I>(tasks: I, query: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| matches_any(query, &[t.title.as_str(), t.description.as_str()]))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, project: &str, title: &str, description: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            project_id: project.into(),
            title: title.into(),
            description: description.into(),
            steps: vec![],
            observations: String::new(),
            logs: String::new(),
            log_file_name: None,
            images: vec![],
            status,
            completed: false,
            created_at: Utc::now(),
        }
    }

    fn fixture() -> Vec<Task> {
        vec![
            task("t1", "p1", "User LOGIN", "", TaskStatus::Ok),
            task("t2", "p1", "Logout", "after login the session ends", TaskStatus::Nok),
            task("t3", "p2", "Checkout", "pay by card", TaskStatus::Ok),
            task("t4", "p1", "Profile", "edit avatar", TaskStatus::Pending),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn project_filter_preserves_order() {
        let tasks = fixture();
        assert_eq!(ids(&tasks_for_project(&tasks, "p1")), vec!["t1", "t2", "t4"]);
        assert!(tasks_for_project(&tasks, "nope").is_empty());
    }

    #[test]
    fn status_filter_all_and_only() {
        let tasks = fixture();
        assert_eq!(filter_by_status(&tasks, StatusFilter::All).len(), 4);
        assert_eq!(
            ids(&filter_by_status(&tasks, TaskStatus::Ok.into())),
            vec!["t1", "t3"]
        );
    }

    #[test]
    fn text_search_matches_title_or_description_case_insensitively() {
        let tasks = fixture();
        assert_eq!(ids(&search_by_text(&tasks, "login")), vec!["t1", "t2"]);
        assert_eq!(ids(&search_by_text(&tasks, "CARD")), vec!["t3"]);
    }

    #[test]
    fn empty_search_returns_everything() {
        let tasks = fixture();
        assert_eq!(search_by_text(&tasks, "").len(), tasks.len());
    }

    #[test]
    fn filters_chain() {
        let tasks = fixture();
        let in_project = tasks_for_project(&tasks, "p1");
        let failing = filter_by_status(in_project, StatusFilter::Only(TaskStatus::Nok));
        let found = search_by_text(failing, "session");
        assert_eq!(ids(&found), vec!["t2"]);
    }

    #[test]
    fn status_filter_parses_names() {
        assert_eq!(StatusFilter::from_name("all").unwrap(), StatusFilter::All);
        assert_eq!(
            StatusFilter::from_name("PENDING").unwrap(),
            StatusFilter::Only(TaskStatus::Pending)
        );
        assert!(StatusFilter::from_name("DONE").is_err());
    }
}
