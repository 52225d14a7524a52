//! Collaborators that turn shaped report data into bytes.
//!
//! Each concern is a trait so the pipeline can be driven with fakes in tests;
//! the shipped implementations are [`PdfRenderer`], [`XlsxWriter`] and
//! [`ZipWriter`].

mod archive;
mod pdf;
mod xlsx;

pub use self::archive::ZipWriter;
pub use self::pdf::PdfRenderer;
pub use self::xlsx::XlsxWriter;

use crate::document::ReportDocument;
use crate::error::ExportError;
use crate::evidence::EvidenceFile;
use crate::tabular::ReportRow;

/// Renders the paginated document model.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ExportError>;

    /// File extension of the rendered artifact.
    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Serializes report rows into a workbook.
pub trait SpreadsheetWriter: Send + Sync {
    fn write(&self, rows: &[ReportRow]) -> Result<Vec<u8>, ExportError>;

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}

/// Bundles the primary artifact and the log files into one archive.
pub trait ArchiveWriter: Send + Sync {
    fn write(
        &self,
        primary_name: &str,
        primary: &[u8],
        logs: &[EvidenceFile],
    ) -> Result<Vec<u8>, ExportError>;

    fn extension(&self) -> &'static str {
        "zip"
    }
}
