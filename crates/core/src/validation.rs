//! Input validation for user-supplied entity fields.

use crate::error::CoreError;

/// Validate a project name and return it trimmed.
///
/// A name is valid when it is non-empty after trimming whitespace.
pub fn validate_project_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate an image reference handed to a task's gallery.
pub fn validate_image_url(url: &str) -> Result<(), CoreError> {
    if url.trim().is_empty() {
        Err(CoreError::Validation("Image URL must not be empty".to_string()))
    } else {
        Ok(())
    }
}
