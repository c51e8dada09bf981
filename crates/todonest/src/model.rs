//! # Domain Model: Todos, Pinned Lists and Pinned Entries
//!
//! This module defines the flat records the engine works on: [`Todo`],
//! [`PinnedList`] and [`PinnedEntry`]. They mirror rows as a persistence
//! layer would store them. Nothing here holds references to other records;
//! relations are plain ids resolved through the [`crate::store::Snapshot`].
//!
//! ## Hierarchy
//!
//! A todo points at its parent through `parent_id` (`None` = root). Its
//! `position` orders it among the todos sharing that parent. Children are
//! never stored; the nested view is derived by [`crate::tree::Forest`].
//!
//! ## Pinning
//!
//! Pinning is a many-to-one membership: a pinned todo has exactly one
//! [`PinnedEntry`], which places it at a `position` inside one
//! [`PinnedList`]. `Todo::pinned` mirrors the existence of that entry.
//!
//! Exactly one list is the primary list. The flag is set when the list is
//! created and never re-derived from list order.
//!
//! ## Titles
//!
//! Titles are single-line text. [`normalize_title`] trims the input and
//! folds any line breaks into single spaces. Empty titles are rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TodoError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub pinned: bool,
    pub parent_id: Option<Uuid>,
    /// Index among siblings sharing `parent_id`
    pub position: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Builds a fresh, incomplete and unpinned todo. `title` is stored as given;
    /// callers normalize it first.
    pub fn new(title: String, parent_id: Option<Uuid>, position: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            completed: false,
            pinned: false,
            parent_id,
            position,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedList {
    pub id: Uuid,
    pub title: String,
    /// Index among all pinned lists
    pub position: usize,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl PinnedList {
    pub fn new(title: String, position: usize, is_primary: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            position,
            is_primary,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedEntry {
    pub id: Uuid,
    pub list_id: Uuid,
    pub todo_id: Uuid,
    /// Index within the owning list
    pub position: usize,
    pub pinned_at: DateTime<Utc>,
}

impl PinnedEntry {
    pub fn new(list_id: Uuid, todo_id: Uuid, position: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id,
            todo_id,
            position,
            pinned_at: Utc::now(),
        }
    }
}

/// Trims a title and folds line breaks into single spaces.
/// Fails with [`TodoError::Validation`] when nothing is left.
pub fn normalize_title(raw: &str) -> Result<String> {
    let title = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        return Err(TodoError::Validation("title cannot be empty".to_string()));
    }
    Ok(title)
}
