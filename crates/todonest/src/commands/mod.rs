//! # Command Layer
//!
//! This module contains the **core business logic** of todonest. Each command
//! lives in its own submodule as plain functions over a [`TodoStore`].
//!
//! ## Role and Responsibilities
//!
//! Commands are where the real work happens:
//! - Check preconditions against a loaded [`Snapshot`]
//! - Compute the resulting [`Changeset`] (new records, removals, positions)
//! - Commit it through the store as one unit
//! - Return a structured [`CmdResult`]
//!
//! The reorder engines ([`move_todos`], [`pinning`], [`lists`]) also expose
//! their planning step as a pure function from a snapshot to
//! [`UpdatedPositions`], which is what most of their tests exercise.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any I/O** beyond the store: no stdout, no formatting
//! - **Partial writes**: a failed precondition returns before anything is
//!   committed
//!
//! ## Command Modules
//!
//! - [`create`]: Create todos
//! - [`update`]: Rename, complete, tag
//! - [`delete`]: Delete a todo and its subtree
//! - [`move_todos`]: Reorder and reparent todos
//! - [`pinning`]: Pin, unpin and reorder pinned entries
//! - [`lists`]: Manage pinned lists
//! - [`get`]: Tree view and search
//! - [`doctor`]: Verify and repair stored data
//! - [`helpers`]: Shared splicing and lookup utilities
//!
//! [`TodoStore`]: crate::store::TodoStore
//! [`Snapshot`]: crate::store::Snapshot
//! [`UpdatedPositions`]: crate::store::UpdatedPositions

use serde::Serialize;

use crate::model::{PinnedList, Todo};
use crate::store::Changeset;
use crate::tree::TodoNode;

pub mod create;
pub mod delete;
pub mod doctor;
pub mod get;
pub mod helpers;
pub mod lists;
pub mod move_todos;
pub mod pinning;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// A pinned list together with its todos in entry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinnedListView {
    pub list: PinnedList,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    /// What was committed. Empty for read-only commands.
    pub changes: Changeset,
    /// Todos created or modified, in their post-operation state
    pub affected_todos: Vec<Todo>,
    /// Todos to display
    pub listed_todos: Vec<TodoNode>,
    /// Pinned lists to display
    pub listed_lists: Vec<PinnedListView>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_changes(mut self, changes: Changeset) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_affected_todos(mut self, todos: Vec<Todo>) -> Self {
        self.affected_todos = todos;
        self
    }

    pub fn with_listed_todos(mut self, nodes: Vec<TodoNode>) -> Self {
        self.listed_todos = nodes;
        self
    }

    pub fn with_listed_lists(mut self, lists: Vec<PinnedListView>) -> Self {
        self.listed_lists = lists;
        self
    }
}
