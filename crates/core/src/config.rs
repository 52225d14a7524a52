//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use crate::error::CoreError;

/// Default directory holding the persisted snapshots.
pub const DEFAULT_DATA_DIR: &str = "./testmaster-data";

/// Default maximum number of log characters printed on a report page.
pub const DEFAULT_LOG_EXCERPT_CHARS: usize = 2000;

/// Default `chrono` format for date-time cells and report headers.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Default heading of the report summary page.
pub const DEFAULT_REPORT_TITLE: &str = "Test Execution Summary";

/// Runtime configuration.
///
/// All fields have defaults suitable for local use; override via environment
/// variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory for the file-backed persistence surface.
    pub data_dir: PathBuf,
    /// Logs longer than this are truncated on report pages.
    pub log_excerpt_max_chars: usize,
    /// `chrono` format string for date-time values in exports.
    pub date_format: String,
    /// Heading of the report summary page.
    pub report_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_excerpt_max_chars: DEFAULT_LOG_EXCERPT_CHARS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            report_title: DEFAULT_REPORT_TITLE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                  |
    /// |---------------------------------|--------------------------|
    /// | `TESTMASTER_DATA_DIR`           | `./testmaster-data`      |
    /// | `TESTMASTER_LOG_EXCERPT_CHARS`  | `2000`                   |
    /// | `TESTMASTER_DATE_FORMAT`        | `%d/%m/%Y %H:%M:%S`      |
    /// | `TESTMASTER_REPORT_TITLE`       | `Test Execution Summary` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("TESTMASTER_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let log_excerpt_max_chars = match lookup("TESTMASTER_LOG_EXCERPT_CHARS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                CoreError::Validation(format!(
                    "TESTMASTER_LOG_EXCERPT_CHARS must be a non-negative integer, got '{raw}'"
                ))
            })?,
            None => defaults.log_excerpt_max_chars,
        };

        let date_format = lookup("TESTMASTER_DATE_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.date_format);

        let report_title = lookup("TESTMASTER_REPORT_TITLE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.report_title);

        Ok(Self {
            data_dir,
            log_excerpt_max_chars,
            date_format,
            report_title,
        })
    }
}
