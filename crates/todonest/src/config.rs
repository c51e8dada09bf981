//! # Configuration
//!
//! Engine settings are managed by [`confique`], layered in priority order:
//! 1. **Environment variables**: `TODONEST_MAX_DEPTH`, `TODONEST_FUZZY_TOLERANCE`, etc.
//! 2. **Config file**: an optional TOML file passed to [`EngineConfig::load`].
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `max_depth` | `3` | Deepest allowed nesting level (root = 0) |
//! | `primary_list_title` | `"Primary"` | Title of the lazily created primary pinned list |
//! | `fuzzy.tolerance` | `0.35` | Span length slack, 0 to 1, as a fraction of the token length |
//! | `fuzzy.max_ratio` | `0.4` | Largest accepted `distance / max(token, span)` |
//! | `fuzzy.min_fuzzy_len` | `3` | Shorter tokens only match exactly |
//!
//! A sample file:
//!
//! ```toml
//! max_depth = 4
//! primary_list_title = "Main"
//!
//! [fuzzy]
//! tolerance = 0.3
//! ```

use std::path::Path;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Deepest allowed nesting level. A root sits at depth 0.
    #[config(default = 3, env = "TODONEST_MAX_DEPTH")]
    pub max_depth: usize,

    /// Title given to the primary pinned list when it is created on demand.
    #[config(default = "Primary", env = "TODONEST_PRIMARY_LIST_TITLE")]
    pub primary_list_title: String,

    #[config(nested)]
    pub fuzzy: FuzzyConfig,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FuzzyConfig {
    /// Candidate spans may differ from the token length by
    /// `max(1, ceil(token_len * tolerance))` characters.
    #[config(default = 0.35, env = "TODONEST_FUZZY_TOLERANCE")]
    pub tolerance: f64,

    /// Largest normalized edit distance still counted as a match.
    #[config(default = 0.4, env = "TODONEST_FUZZY_MAX_RATIO")]
    pub max_ratio: f64,

    /// Tokens shorter than this only match exactly.
    #[config(default = 3, env = "TODONEST_FUZZY_MIN_LEN")]
    pub min_fuzzy_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            primary_list_title: "Primary".to_string(),
            fuzzy: FuzzyConfig::default(),
        }
    }
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.35,
            max_ratio: 0.4,
            min_fuzzy_len: 3,
        }
    }
}

impl EngineConfig {
    /// Loads the layered configuration. A missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        let config = builder.load()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.primary_list_title.trim().is_empty() {
            return Err(TodoError::Validation(
                "primary_list_title cannot be empty".to_string(),
            ));
        }
        self.fuzzy.validate()
    }
}

impl FuzzyConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.tolerance) {
            return Err(TodoError::Validation(format!(
                "fuzzy.tolerance must be within 0..=1, got {}",
                self.tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.max_ratio) {
            return Err(TodoError::Validation(format!(
                "fuzzy.max_ratio must be within 0..=1, got {}",
                self.max_ratio
            )));
        }
        Ok(())
    }
}
