//! Tag name rules.
//!
//! Tags are stored lowercased. A valid tag:
//! - starts with an ASCII letter
//! - contains only ASCII letters, digits, `_` and `-`
//! - has no `--` run and no trailing `-`

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    #[error("tag cannot be empty")]
    Empty,
    #[error("tag must start with a letter, found '{0}'")]
    InvalidStart(char),
    #[error("tag cannot end with a hyphen")]
    EndsWithHyphen,
    #[error("tag cannot contain consecutive hyphens")]
    ConsecutiveHyphens,
    #[error("tag contains '{0}' (only letters, digits, '_' and '-' are allowed)")]
    InvalidCharacter(char),
}

/// Checks `name` against the tag rules. Expects an already normalized name.
///
/// ```
/// use todonest::tags::validation::validate_tag_name;
///
/// assert!(validate_tag_name("home").is_ok());
/// assert!(validate_tag_name("q3-review_2").is_ok());
/// assert!(validate_tag_name("3d").is_err());
/// assert!(validate_tag_name("a--b").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), TagValidationError> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(TagValidationError::Empty)?;
    if !first.is_ascii_alphabetic() {
        return Err(TagValidationError::InvalidStart(first));
    }

    let mut prev = first;
    for ch in chars {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            return Err(TagValidationError::InvalidCharacter(ch));
        }
        if ch == '-' && prev == '-' {
            return Err(TagValidationError::ConsecutiveHyphens);
        }
        prev = ch;
    }

    if prev == '-' {
        return Err(TagValidationError::EndsWithHyphen);
    }
    Ok(())
}
