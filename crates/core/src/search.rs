//! Text matching helpers used by list filtering.

/// Case-insensitive substring match of `query` against any of `fields`.
///
/// An empty query matches everything, so a cleared search box shows the full
/// list.
///
/// # Examples
///
/// ```
/// use testmaster_core::search::matches_any;
/// assert!(matches_any("LOGIN", &["User login flow", ""]));
/// assert!(!matches_any("logout", &["User login flow"]));
/// assert!(matches_any("", &["anything"]));
/// ```
pub fn matches_any(query: &str, fields: &[&str]) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
