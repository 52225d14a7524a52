//! Spreadsheet shaping: one flat row per task.

use serde::Serialize;
use testmaster_db::models::task::{Task, TestStep};

use crate::evidence::EvidencePlan;
use crate::settings::ReportSettings;

/// Column headers, in order.
pub const COLUMNS: [&str; 9] = [
    "#",
    "Title",
    "Status",
    "Description",
    "Steps",
    "Observations",
    "Log File",
    "Images",
    "Created At",
];

/// Sheet name used by the spreadsheet writer.
pub const SHEET_NAME: &str = "Test Report";

/// Placeholder in the Log File column for tasks without logs.
pub const NO_LOG_FILE: &str = "N/A";

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub number: usize,
    pub title: String,
    pub status: String,
    pub description: String,
    /// One line per step: `[X] text` or `[ ] text`.
    pub steps: String,
    pub observations: String,
    pub log_file: String,
    pub image_count: usize,
    pub created_at: String,
}

impl ReportRow {
    /// Text cells in [`COLUMNS`] order. Numeric columns are rendered as text.
    pub fn cells(&self) -> [String; 9] {
        [
            self.number.to_string(),
            self.title.clone(),
            self.status.clone(),
            self.description.clone(),
            self.steps.clone(),
            self.observations.clone(),
            self.log_file.clone(),
            self.image_count.to_string(),
            self.created_at.clone(),
        ]
    }
}

/// Render the checklist as a multi-line cell.
pub fn step_lines(steps: &[TestStep]) -> String {
    steps
        .iter()
        .map(|s| format!("[{}] {}", if s.completed { 'X' } else { ' ' }, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_rows(tasks: &[&Task], evidence: &EvidencePlan, settings: &ReportSettings) -> Vec<ReportRow> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| ReportRow {
            number: i + 1,
            title: task.title.clone(),
            status: task.status.name().to_string(),
            description: task.description.clone(),
            steps: step_lines(&task.steps),
            observations: task.observations.clone(),
            log_file: evidence
                .file_for(&task.id)
                .map(|f| f.file_name.clone())
                .unwrap_or_else(|| NO_LOG_FILE.to_string()),
            image_count: task.images.len(),
            created_at: settings.format_timestamp(task.created_at),
        })
        .collect()
}
