/// Error type for report export failures.
///
/// Every variant leaves the entity store untouched; nothing is written to
/// disk by the pipeline itself.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Another export on the same pipeline has not finished yet.
    #[error("An export is already in progress")]
    InProgress,

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Document rendering failed: {0}")]
    Document(String),

    #[error("Spreadsheet generation failed: {0}")]
    Spreadsheet(String),

    #[error("Archive packaging failed: {0}")]
    Archive(String),
}

impl ExportError {
    /// Short message suitable for showing to the person who clicked export.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InProgress => "An export is already running. Please wait for it to finish.",
            Self::ProjectNotFound(_) => "The selected project no longer exists.",
            Self::Document(_) => "Could not generate the PDF report.",
            Self::Spreadsheet(_) => "Could not generate the spreadsheet.",
            Self::Archive(_) => "Could not package the report archive.",
        }
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        Self::Document(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_do_not_leak_details() {
        let err = ExportError::Archive("disk full at offset 1234".into());
        assert!(!err.user_message().contains("1234"));
        assert!(err.to_string().contains("1234"));
    }
}
