//! The export pipeline: shape, render, package.
//!
//! An export never touches the entity store. It either returns a complete
//! archive or an [`ExportError`]; no partial bundle is ever produced.

use std::sync::atomic::{AtomicBool, Ordering};

use testmaster_core::naming::report_file_name;
use testmaster_core::types::{self, Timestamp};
use testmaster_db::models::task::Task;
use testmaster_db::repositories::{ProjectRepo, TaskRepo};
use testmaster_db::EntityStore;

use crate::document::build_document;
use crate::error::ExportError;
use crate::evidence::EvidencePlan;
use crate::render::{
    ArchiveWriter, DocumentRenderer, PdfRenderer, SpreadsheetWriter, XlsxWriter, ZipWriter,
};
use crate::settings::ReportSettings;
use crate::tabular::build_rows;

/// Primary artifact of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Spreadsheet,
}

impl ExportFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// A finished export, ready to be offered for download.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Archive file name, e.g. `QA_Report_2026-03-09.zip`.
    pub file_name: String,
    /// Name of the primary artifact inside the archive.
    pub primary_file: String,
    /// Archive paths of the log files, in report order.
    pub log_files: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Runs exports one at a time.
pub struct ExportPipeline {
    settings: ReportSettings,
    document: Box<dyn DocumentRenderer>,
    spreadsheet: Box<dyn SpreadsheetWriter>,
    archive: Box<dyn ArchiveWriter>,
    busy: AtomicBool,
}

/// Clears the busy flag when the export finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportPipeline {
    /// Pipeline with the PDF, xlsx and zip collaborators.
    pub fn new(settings: ReportSettings) -> Self {
        Self {
            settings,
            document: Box::new(PdfRenderer),
            spreadsheet: Box::new(XlsxWriter),
            archive: Box::new(ZipWriter),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_document_renderer(mut self, renderer: impl DocumentRenderer + 'static) -> Self {
        self.document = Box::new(renderer);
        self
    }

    pub fn with_spreadsheet_writer(mut self, writer: impl SpreadsheetWriter + 'static) -> Self {
        self.spreadsheet = Box::new(writer);
        self
    }

    pub fn with_archive_writer(mut self, writer: impl ArchiveWriter + 'static) -> Self {
        self.archive = Box::new(writer);
        self
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// `true` while an export is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Export every task of one project, titled with the project name.
    pub fn export_project(
        &self,
        store: &EntityStore,
        project_id: &str,
        format: ExportFormat,
    ) -> Result<ExportBundle, ExportError> {
        let project = ProjectRepo::find_by_id(store, project_id)
            .ok_or_else(|| ExportError::ProjectNotFound(project_id.to_string()))?;
        let tasks = TaskRepo::list_by_project(store, project_id);
        self.run(&tasks, Some(project.name.as_str()), format, types::now())
    }

    /// Export an arbitrary task snapshot, generated now.
    pub fn export<'a, I>(&self, tasks: I, format: ExportFormat) -> Result<ExportBundle, ExportError>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        self.export_at(tasks, format, types::now())
    }

    /// Export with an explicit generation time (report date and file names).
    pub fn export_at<'a, I>(
        &self,
        tasks: I,
        format: ExportFormat,
        generated_at: Timestamp,
    ) -> Result<ExportBundle, ExportError>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let tasks: Vec<&Task> = tasks.into_iter().collect();
        self.run(&tasks, None, format, generated_at)
    }

    fn run(
        &self,
        tasks: &[&Task],
        project_name: Option<&str>,
        format: ExportFormat,
        generated_at: Timestamp,
    ) -> Result<ExportBundle, ExportError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(format = format.name(), "Export rejected, another export is running");
            return Err(ExportError::InProgress);
        }
        let _guard = BusyGuard(&self.busy);

        tracing::info!(format = format.name(), tasks = tasks.len(), "Export started");
        match self.build(tasks, project_name, format, generated_at) {
            Ok(bundle) => {
                tracing::info!(
                    file = %bundle.file_name,
                    bytes = bundle.bytes.len(),
                    log_files = bundle.log_files.len(),
                    "Export finished"
                );
                Ok(bundle)
            }
            Err(e) => {
                tracing::error!(format = format.name(), error = %e, "Export failed");
                Err(e)
            }
        }
    }

    fn build(
        &self,
        tasks: &[&Task],
        project_name: Option<&str>,
        format: ExportFormat,
        generated_at: Timestamp,
    ) -> Result<ExportBundle, ExportError> {
        let date = generated_at
            .with_timezone(&self.settings.utc_offset)
            .date_naive();
        let evidence = EvidencePlan::for_tasks(tasks);

        let (primary_file, primary) = match format {
            ExportFormat::Pdf => {
                let document =
                    build_document(tasks, &evidence, &self.settings, project_name, generated_at);
                let bytes = self.document.render(&document)?;
                (report_file_name(date, self.document.extension()), bytes)
            }
            ExportFormat::Spreadsheet => {
                let rows = build_rows(tasks, &evidence, &self.settings);
                let bytes = self.spreadsheet.write(&rows)?;
                (report_file_name(date, self.spreadsheet.extension()), bytes)
            }
        };

        let bytes = self.archive.write(&primary_file, &primary, &evidence.files)?;

        Ok(ExportBundle {
            file_name: report_file_name(date, self.archive.extension()),
            primary_file,
            log_files: evidence.archive_paths(),
            bytes,
        })
    }
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("settings", &self.settings)
            .field("busy", &self.is_busy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use testmaster_core::status::TaskStatus;

    use crate::document::ReportDocument;
    use crate::evidence::EvidenceFile;

    fn task(id: &str, logs: &str) -> Task {
        Task {
            id: id.into(),
            project_id: "p1".into(),
            title: format!("Task {id}"),
            description: String::new(),
            steps: vec![],
            observations: String::new(),
            logs: logs.into(),
            log_file_name: None,
            images: vec![],
            status: TaskStatus::Pending,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Records what reached the archive stage instead of zipping.
    struct ListingArchive;

    impl ArchiveWriter for ListingArchive {
        fn write(
            &self,
            primary_name: &str,
            _primary: &[u8],
            logs: &[EvidenceFile],
        ) -> Result<Vec<u8>, ExportError> {
            let mut names = vec![primary_name.to_string()];
            names.extend(logs.iter().map(EvidenceFile::archive_path));
            Ok(names.join("\n").into_bytes())
        }
    }

    struct FailingRenderer;

    impl DocumentRenderer for FailingRenderer {
        fn render(&self, _document: &ReportDocument) -> Result<Vec<u8>, ExportError> {
            Err(ExportError::Document("font table missing".into()))
        }
    }

    struct FailingArchive;

    impl ArchiveWriter for FailingArchive {
        fn write(&self, _: &str, _: &[u8], _: &[EvidenceFile]) -> Result<Vec<u8>, ExportError> {
            Err(ExportError::Archive("disk full".into()))
        }
    }

    /// Blocks inside render until released.
    struct GatedRenderer {
        entered: mpsc::SyncSender<()>,
        release: std::sync::Mutex<mpsc::Receiver<()>>,
    }

    impl DocumentRenderer for GatedRenderer {
        fn render(&self, _document: &ReportDocument) -> Result<Vec<u8>, ExportError> {
            let _ = self.entered.send(());
            let release = self
                .release
                .lock()
                .map_err(|_| ExportError::Document("gate poisoned".into()))?;
            let _ = release.recv();
            Ok(b"%PDF".to_vec())
        }
    }

    #[test]
    fn only_tasks_with_logs_reach_the_archive() {
        let tasks = [task("t1", ""), task("t2", "abc"), task("t3", "")];
        let generated_at = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
        let pipeline = ExportPipeline::new(ReportSettings::default())
            .with_archive_writer(ListingArchive);

        let bundle = pipeline
            .export_at(&tasks, ExportFormat::Spreadsheet, generated_at)
            .unwrap();

        assert_eq!(bundle.file_name, "QA_Report_2026-03-09.zip");
        assert_eq!(bundle.primary_file, "QA_Report_2026-03-09.xlsx");
        assert_eq!(bundle.log_files, vec!["logs/scenario_02_task_t2.txt"]);
        assert_eq!(
            String::from_utf8(bundle.bytes).unwrap(),
            "QA_Report_2026-03-09.xlsx\nlogs/scenario_02_task_t2.txt"
        );
    }

    #[test]
    fn renderer_failure_fails_the_whole_export() {
        let tasks = [task("t1", "abc")];
        let pipeline = ExportPipeline::new(ReportSettings::default())
            .with_document_renderer(FailingRenderer);

        let err = pipeline.export(&tasks, ExportFormat::Pdf).unwrap_err();
        assert_matches!(err, ExportError::Document(_));
        assert_eq!(err.user_message(), "Could not generate the PDF report.");
        assert!(!pipeline.is_busy());
    }

    #[test]
    fn archive_failure_yields_no_bundle() {
        let tasks = [task("t1", "abc")];
        let pipeline =
            ExportPipeline::new(ReportSettings::default()).with_archive_writer(FailingArchive);
        assert_matches!(
            pipeline.export(&tasks, ExportFormat::Spreadsheet),
            Err(ExportError::Archive(_))
        );
    }

    #[test]
    fn second_export_while_running_is_rejected() {
        let (entered_tx, entered_rx) = mpsc::sync_channel(1);
        let (release_tx, release_rx) = mpsc::channel();
        let pipeline = Arc::new(
            ExportPipeline::new(ReportSettings::default()).with_document_renderer(GatedRenderer {
                entered: entered_tx,
                release: std::sync::Mutex::new(release_rx),
            }),
        );

        let running = {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.export(&[task("t1", "")], ExportFormat::Pdf))
        };

        entered_rx.recv().unwrap();
        assert!(pipeline.is_busy());
        assert_matches!(
            pipeline.export(&[task("t2", "")], ExportFormat::Pdf),
            Err(ExportError::InProgress)
        );

        release_tx.send(()).unwrap();
        assert!(running.join().unwrap().is_ok());
        assert!(!pipeline.is_busy());
    }

    #[test]
    fn file_date_follows_the_configured_offset() {
        let settings = ReportSettings::default()
            .with_utc_offset(chrono::FixedOffset::east_opt(3 * 3600).unwrap());
        let pipeline = ExportPipeline::new(settings).with_archive_writer(ListingArchive);
        let late = Utc.with_ymd_and_hms(2026, 3, 9, 22, 0, 0).unwrap();

        let bundle = pipeline.export_at(&[], ExportFormat::Spreadsheet, late).unwrap();
        assert_eq!(bundle.file_name, "QA_Report_2026-03-10.zip");
    }
}
