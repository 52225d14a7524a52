//! Export file naming convention engine.
//!
//! Generates filesystem-safe names for report artifacts and the per-task log
//! files bundled alongside them.

use chrono::NaiveDate;

/// Maximum length (in characters) of a sanitized file name token.
pub const MAX_FILE_TOKEN_LEN: usize = 64;

/// Prefix shared by every report artifact.
pub const REPORT_FILE_PREFIX: &str = "QA_Report";

/// Extension appended to log files that do not carry one.
pub const LOG_FILE_EXTENSION: &str = "txt";

/// Extensions accepted verbatim on user-supplied log file names.
const KNOWN_LOG_EXTENSIONS: &[&str] = &[".txt", ".log"];

/// Reduce arbitrary text to a filesystem-safe token.
///
/// - ASCII alphanumerics, `-` and `.` are kept.
/// - Everything else (spaces, path separators, accents) becomes `_`.
/// - Runs of `_` collapse into one; leading/trailing `_` and `.` are trimmed.
/// - The result is capped at [`MAX_FILE_TOKEN_LEN`] characters.
///
/// Returns an empty string when nothing usable remains.
///
/// # Examples
///
/// ```
/// use testmaster_core::naming::sanitize_file_token;
///
/// assert_eq!(sanitize_file_token("Login  errors"), "Login_errors");
/// assert_eq!(sanitize_file_token("../../etc/passwd"), "etc_passwd");
/// assert_eq!(sanitize_file_token("***"), "");
/// ```
pub fn sanitize_file_token(input: &str) -> String {
    let mut token = String::with_capacity(input.len());
    for c in input.chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            c
        } else {
            '_'
        };
        if mapped == '_' && token.ends_with('_') {
            continue;
        }
        token.push(mapped);
    }

    let trimmed = token.trim_matches(|c| c == '_' || c == '.');
    let capped: String = trimmed.chars().take(MAX_FILE_TOKEN_LEN).collect();
    capped.trim_end_matches(|c| c == '_' || c == '.').to_string()
}

/// Name of the full-text log file for the task at 1-based `index`.
///
/// A user-supplied `custom` name wins when it sanitizes to something
/// non-empty; otherwise the name is derived from the index and title.
///
/// # Examples
///
/// ```
/// use testmaster_core::naming::log_file_name;
///
/// assert_eq!(
///     log_file_name(2, "Verify total price", None),
///     "scenario_02_verify_total_price.txt"
/// );
/// assert_eq!(log_file_name(1, "x", Some("checkout errors")), "checkout_errors.txt");
/// assert_eq!(log_file_name(1, "x", Some("server.log")), "server.log");
/// assert_eq!(log_file_name(7, "", None), "scenario_07_untitled.txt");
/// ```
pub fn log_file_name(index: usize, title: &str, custom: Option<&str>) -> String {
    if let Some(custom) = custom {
        let token = sanitize_file_token(custom);
        if !token.is_empty() {
            let lower = token.to_lowercase();
            if KNOWN_LOG_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
                return token;
            }
            return format!("{token}.{LOG_FILE_EXTENSION}");
        }
    }

    let slug = sanitize_file_token(title).to_lowercase();
    let slug = if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    };
    format!("scenario_{index:02}_{slug}.{LOG_FILE_EXTENSION}")
}

/// Report artifact file name for the given date and extension.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use testmaster_core::naming::report_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
/// assert_eq!(report_file_name(date, "pdf"), "QA_Report_2026-03-09.pdf");
/// ```
pub fn report_file_name(date: NaiveDate, extension: &str) -> String {
    format!("{REPORT_FILE_PREFIX}_{}.{extension}", date.format("%Y-%m-%d"))
}

/// Make `name` unique against `taken` by inserting `_2`, `_3`, ... before the
/// extension.
pub fn dedupe_file_name(name: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    };
    (2..)
        .map(|n| format!("{stem}_{n}{ext}"))
        .find(|candidate| !taken.iter().any(|t| t == candidate))
        .unwrap_or_else(|| name.to_string())
}
