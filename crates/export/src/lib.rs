//! Report export: shaping a task collection into report artifacts and
//! packaging them with the full-text log evidence.
//!
//! The shaping modules ([`tabular`], [`document`], [`evidence`]) are pure
//! functions over a task snapshot. [`render`] holds the collaborator traits
//! and their shipped implementations, and [`pipeline::ExportPipeline`] ties
//! them together.

pub mod document;
pub mod error;
pub mod evidence;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod tabular;

pub use error::ExportError;
pub use pipeline::{ExportBundle, ExportFormat, ExportPipeline};
pub use settings::ReportSettings;
