//! Image ingestion: turning uploaded files and pasted bytes into gallery
//! entries.
//!
//! Files are read concurrently. Each finished read takes the store lock and
//! appends against the task as it is at that moment, so reads that complete
//! out of order never overwrite each other's images.

use std::path::{Path, PathBuf};

use futures::stream::{FuturesUnordered, StreamExt};
use testmaster_core::data_uri;
use testmaster_core::error::CoreError;
use tokio::sync::Mutex;

use crate::models::task::Task;
use crate::repositories::TaskRepo;
use crate::store::EntityStore;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error(transparent)]
    Rejected(#[from] CoreError),
}

/// Outcome of a multi-file ingestion.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Images appended to the task.
    pub added: usize,
    /// Files that could not be ingested, with the reason.
    pub failures: Vec<(PathBuf, IngestError)>,
}

/// Encode raw image bytes (clipboard, camera frame) as a data URI.
pub fn data_uri_from_bytes(bytes: &[u8]) -> Result<String, IngestError> {
    data_uri::image_data_uri(bytes).map_err(|e| IngestError::UnsupportedImage(e.to_string()))
}

/// Read an image file and encode it as a data URI.
pub async fn read_image_file(path: &Path) -> Result<String, IngestError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    data_uri_from_bytes(&bytes)
}

/// Append pasted or captured image bytes to a task.
pub fn ingest_bytes(
    store: &mut EntityStore,
    task_id: &str,
    bytes: &[u8],
    description: &str,
) -> Result<Task, IngestError> {
    let uri = data_uri_from_bytes(bytes)?;
    append_image(store, task_id, &uri, description)
}

fn append_image(
    store: &mut EntityStore,
    task_id: &str,
    uri: &str,
    description: &str,
) -> Result<Task, IngestError> {
    TaskRepo::add_image(store, task_id, uri, description).map_err(|e| match e {
        CoreError::NotFound { id, .. } => IngestError::TaskNotFound(id),
        other => IngestError::Rejected(other),
    })
}

/// Read `paths` concurrently and append each image to the task as it lands.
///
/// Individual file failures are collected in the report; only a missing task
/// fails the whole call.
pub async fn ingest_files(
    store: &Mutex<EntityStore>,
    task_id: &str,
    paths: &[PathBuf],
) -> Result<IngestReport, IngestError> {
    if TaskRepo::find_by_id(&*store.lock().await, task_id).is_none() {
        return Err(IngestError::TaskNotFound(task_id.to_string()));
    }

    let mut reads: FuturesUnordered<_> = paths
        .iter()
        .map(|path| async move { (path, read_image_file(path).await) })
        .collect();

    let mut report = IngestReport::default();
    while let Some((path, result)) = reads.next().await {
        let outcome = match result {
            Ok(uri) => {
                let mut guard = store.lock().await;
                append_image(&mut guard, task_id, &uri, "").map(|_| ())
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => report.added += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), task_id, error = %e, "Image ingestion failed");
                report.failures.push((path.clone(), e));
            }
        }
    }

    tracing::info!(
        task_id,
        added = report.added,
        failed = report.failures.len(),
        "Image ingestion finished"
    );
    Ok(report)
}
