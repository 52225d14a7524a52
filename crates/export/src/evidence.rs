//! Full-text log evidence packaged next to the primary report artifact.
//!
//! Layout of the exported archive:
//! ```text
//! QA_Report_2026-03-09.pdf      (or .xlsx)
//! logs/
//!   scenario_02_verify_total_price.txt
//!   checkout_errors.txt
//!   ...
//! ```

use serde::Serialize;
use testmaster_core::naming::{dedupe_file_name, log_file_name};
use testmaster_db::models::task::Task;

/// Archive directory holding the log files.
pub const LOGS_DIR: &str = "logs";

/// One log file to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceFile {
    pub task_id: String,
    /// 1-based position of the task in the report.
    pub task_number: usize,
    /// File name inside [`LOGS_DIR`].
    pub file_name: String,
    pub contents: String,
}

impl EvidenceFile {
    /// Path of the file inside the archive.
    pub fn archive_path(&self) -> String {
        format!("{LOGS_DIR}/{}", self.file_name)
    }
}

/// The log files of one export, in report order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvidencePlan {
    pub files: Vec<EvidenceFile>,
}

impl EvidencePlan {
    /// One file per task with non-empty logs. Names are unique within the
    /// plan.
    pub fn for_tasks(tasks: &[&Task]) -> Self {
        let mut files: Vec<EvidenceFile> = Vec::new();
        let mut taken: Vec<String> = Vec::new();

        for (i, task) in tasks.iter().enumerate() {
            if !task.has_logs() {
                continue;
            }
            let number = i + 1;
            let base = log_file_name(number, &task.title, task.log_file_name.as_deref());
            let file_name = dedupe_file_name(&base, &taken);
            taken.push(file_name.clone());
            files.push(EvidenceFile {
                task_id: task.id.clone(),
                task_number: number,
                file_name,
                contents: task.logs.clone(),
            });
        }

        Self { files }
    }

    /// The evidence file of `task_id`, if it has one.
    pub fn file_for(&self, task_id: &str) -> Option<&EvidenceFile> {
        self.files.iter().find(|f| f.task_id == task_id)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn archive_paths(&self) -> Vec<String> {
        self.files.iter().map(EvidenceFile::archive_path).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use testmaster_core::status::TaskStatus;

    fn task(id: &str, title: &str, logs: &str, custom: Option<&str>) -> Task {
        Task {
            id: id.into(),
            project_id: "p1".into(),
            title: title.into(),
            description: String::new(),
            steps: vec![],
            observations: String::new(),
            logs: logs.into(),
            log_file_name: custom.map(str::to_string),
            images: vec![],
            status: TaskStatus::Pending,
            completed: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_tasks_with_logs_produce_files() {
        let tasks = [
            task("t1", "Login", "", None),
            task("t2", "Verify total price", "abc", None),
            task("t3", "Logout", "", None),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let plan = EvidencePlan::for_tasks(&refs);

        assert_eq!(plan.len(), 1);
        let file = &plan.files[0];
        assert_eq!(file.task_id, "t2");
        assert_eq!(file.task_number, 2);
        assert_eq!(file.archive_path(), "logs/scenario_02_verify_total_price.txt");
        assert_eq!(file.contents, "abc");
    }

    #[test]
    fn custom_names_are_sanitized_and_deduplicated() {
        let tasks = [
            task("t1", "A", "one", Some("server errors")),
            task("t2", "B", "two", Some("server/errors")),
            task("t3", "C", "three", Some("  ")),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let plan = EvidencePlan::for_tasks(&refs);

        let names: Vec<&str> = plan.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["server_errors.txt", "server_errors_2.txt", "scenario_03_c.txt"]
        );
        assert_eq!(plan.file_for("t2").unwrap().contents, "two");
        assert!(plan.file_for("missing").is_none());
    }

    #[test]
    fn no_logs_means_empty_plan() {
        let tasks = [task("t1", "Login", "", None)];
        let refs: Vec<&Task> = tasks.iter().collect();
        assert!(EvidencePlan::for_tasks(&refs).is_empty());
    }
}
