//! Paginated document model of a report.
//!
//! A [`ReportDocument`] is always a summary page, exactly one page per task
//! and a closing sign-off page. Renderers may spill a long task page onto
//! continuation sheets, but the model itself never splits a task.

use serde::Serialize;
use testmaster_core::status::TaskStatus;
use testmaster_core::types::Timestamp;
use testmaster_db::models::task::{StatusCounts, Task};

use crate::evidence::EvidencePlan;
use crate::settings::ReportSettings;

pub const UNTITLED: &str = "Untitled";
pub const NO_DESCRIPTION: &str = "No description provided.";

#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub project_name: Option<String>,
    /// Formatted generation time.
    pub generated_at: String,
    pub pages: Vec<ReportPage>,
}

impl ReportDocument {
    pub fn task_pages(&self) -> impl Iterator<Item = &TaskPage> {
        self.pages.iter().filter_map(|page| match page {
            ReportPage::Task(task) => Some(task),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportPage {
    Summary(SummaryPage),
    Task(TaskPage),
    SignOff(SignOffPage),
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryPage {
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// 1-based sequence number ("Scenario #n").
    pub number: usize,
    pub task_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub description: String,
    pub steps: Vec<StepLine>,
    pub images: Vec<Figure>,
    pub observations: Option<String>,
    pub logs: Option<LogExcerpt>,
}

impl TaskPage {
    pub fn badge(&self) -> &'static str {
        self.status.badge()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepLine {
    pub number: usize,
    pub description: String,
    pub completed: bool,
}

impl StepLine {
    pub fn marker(&self) -> &'static str {
        if self.completed {
            "OK"
        } else {
            "SKIP"
        }
    }
}

/// An evidence screenshot and its caption.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub url: String,
    pub caption: Option<String>,
}

/// The printed portion of a task's logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogExcerpt {
    pub text: String,
    pub truncated: bool,
    /// Archive path of the full-text log file.
    pub full_file: Option<String>,
}

impl LogExcerpt {
    /// Cut `logs` to at most `max_chars` characters.
    pub fn new(logs: &str, max_chars: usize, full_file: Option<String>) -> Self {
        match logs.char_indices().nth(max_chars) {
            Some((cut, _)) => Self {
                text: logs[..cut].to_string(),
                truncated: true,
                full_file,
            },
            None => Self {
                text: logs.to_string(),
                truncated: false,
                full_file,
            },
        }
    }

    /// Line printed under a truncated excerpt.
    pub fn note(&self) -> Option<String> {
        if !self.truncated {
            return None;
        }
        Some(match &self.full_file {
            Some(path) => format!("Log truncated. Full output in {path}"),
            None => "Log truncated.".to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignOffPage {
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Signature {
    pub role: String,
    pub hint: String,
}

impl Default for SignOffPage {
    fn default() -> Self {
        Self {
            signatures: vec![
                Signature {
                    role: "Test Executor".into(),
                    hint: "QA Engineer / Analyst".into(),
                },
                Signature {
                    role: "Approval / Stakeholder".into(),
                    hint: "Product Owner / Tech Lead".into(),
                },
            ],
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn build_document(
    tasks: &[&Task],
    evidence: &EvidencePlan,
    settings: &ReportSettings,
    project_name: Option<&str>,
    generated_at: Timestamp,
) -> ReportDocument {
    let mut pages = Vec::with_capacity(tasks.len() + 2);
    pages.push(ReportPage::Summary(SummaryPage {
        counts: StatusCounts::from_tasks(tasks.iter().copied()),
    }));

    for (i, task) in tasks.iter().enumerate() {
        let logs = task.has_logs().then(|| {
            LogExcerpt::new(
                &task.logs,
                settings.log_excerpt_max_chars,
                evidence.file_for(&task.id).map(|f| f.archive_path()),
            )
        });

        pages.push(ReportPage::Task(TaskPage {
            number: i + 1,
            task_id: task.id.clone(),
            title: non_empty(&task.title).unwrap_or_else(|| UNTITLED.to_string()),
            status: task.status,
            description: non_empty(&task.description)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            steps: task
                .steps
                .iter()
                .enumerate()
                .map(|(n, step)| StepLine {
                    number: n + 1,
                    description: step.description.clone(),
                    completed: step.completed,
                })
                .collect(),
            images: task
                .images
                .iter()
                .map(|img| Figure {
                    url: img.url.clone(),
                    caption: non_empty(&img.description),
                })
                .collect(),
            observations: non_empty(&task.observations),
            logs,
        }));
    }

    pages.push(ReportPage::SignOff(SignOffPage::default()));

    ReportDocument {
        title: settings.title.clone(),
        project_name: project_name.map(str::to_string),
        generated_at: settings.format_timestamp(generated_at),
        pages,
    }
}
