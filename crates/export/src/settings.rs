//! Presentation settings applied to every generated report.

use std::fmt::Write as _;

use chrono::{FixedOffset, Offset, Utc};
use testmaster_core::config::AppConfig;
use testmaster_core::types::Timestamp;

/// Fallback when the configured date format cannot be rendered.
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Heading of the summary page.
    pub title: String,
    /// `strftime` pattern for timestamps shown in reports.
    pub date_format: String,
    /// Maximum number of log characters printed on a task page.
    pub log_excerpt_max_chars: usize,
    /// Offset used to present timestamps as local time.
    pub utc_offset: FixedOffset,
}

impl ReportSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            title: config.report_title.clone(),
            date_format: config.date_format.clone(),
            log_excerpt_max_chars: config.log_excerpt_max_chars,
            utc_offset: Utc.fix(),
        }
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Format `ts` in the configured offset and pattern.
    ///
    /// An invalid pattern falls back to an ISO-like layout instead of
    /// failing the export.
    pub fn format_timestamp(&self, ts: Timestamp) -> String {
        let local = ts.with_timezone(&self.utc_offset);
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.date_format)).is_ok() {
            return out;
        }
        tracing::debug!(pattern = %self.date_format, "Invalid report date format, using fallback");
        local.format(FALLBACK_DATE_FORMAT).to_string()
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
