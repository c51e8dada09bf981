//! Tags attached to todos.
//!
//! Tags are free-form labels used by the search tag filter. They are
//! normalized before they are stored: trimmed, lowercased, a leading `#`
//! dropped, duplicates removed (first occurrence wins).

pub mod validation;

pub use validation::{validate_tag_name, TagValidationError};

use crate::error::{Result, TodoError};

/// Normalizes and validates a list of tags, preserving first-seen order.
pub fn normalize_tags<I, T>(tags: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for raw in tags {
        let name = normalize_tag(raw.as_ref());
        validate_tag_name(&name).map_err(|reason| TodoError::InvalidTag {
            name: raw.as_ref().to_string(),
            reason,
        })?;
        if !normalized.contains(&name) {
            normalized.push(name);
        }
    }
    Ok(normalized)
}

/// Canonical form of a single tag, without validation.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}
