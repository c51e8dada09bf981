//! In-place edits of a single todo: title, completion, tags.
//!
//! Completion never cascades. Completing a parent leaves its children as they
//! are, and completing every child does not complete the parent.

use uuid::Uuid;

use super::helpers::require_todo;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{normalize_title, Todo};
use crate::store::{Changeset, TodoStore};
use crate::tags::normalize_tags;

/// Loads `id`, applies `change` to a copy and commits it when anything changed.
fn edit<S, F>(store: &mut S, id: Uuid, change: F) -> Result<(Todo, Changeset)>
where
    S: TodoStore,
    F: FnOnce(&mut Todo) -> Result<()>,
{
    let snapshot = store.load()?;
    let current = require_todo(&snapshot, id)?;
    let mut todo = current.clone();
    change(&mut todo)?;
    if todo == *current {
        return Ok((todo, Changeset::new()));
    }

    todo.touch();
    let changes = Changeset {
        todos: vec![todo.clone()],
        ..Default::default()
    };
    store.commit(&changes)?;
    Ok((todo, changes))
}

fn finish(todo: Todo, changes: Changeset, message: String) -> CmdResult {
    let mut result = CmdResult::default().with_changes(changes);
    result.add_message(CmdMessage::success(message));
    result.with_affected_todos(vec![todo])
}

pub fn rename<S: TodoStore>(store: &mut S, id: Uuid, title: &str) -> Result<CmdResult> {
    let title = normalize_title(title)?;
    let (todo, changes) = edit(store, id, |t| {
        t.title = title;
        Ok(())
    })?;
    let message = format!("Todo renamed: {}", todo.title);
    Ok(finish(todo, changes, message))
}

pub fn set_completed<S: TodoStore>(store: &mut S, id: Uuid, completed: bool) -> Result<CmdResult> {
    let (todo, changes) = edit(store, id, |t| {
        t.completed = completed;
        Ok(())
    })?;
    let verb = if completed { "completed" } else { "reopened" };
    let message = format!("Todo {verb}: {}", todo.title);
    Ok(finish(todo, changes, message))
}

pub fn toggle_completed<S: TodoStore>(store: &mut S, id: Uuid) -> Result<CmdResult> {
    let completed = !require_todo(&store.load()?, id)?.completed;
    set_completed(store, id, completed)
}

/// Replaces the tags of `id`.
pub fn set_tags<S: TodoStore>(store: &mut S, id: Uuid, tags: &[String]) -> Result<CmdResult> {
    let tags = normalize_tags(tags)?;
    let (todo, changes) = edit(store, id, |t| {
        t.tags = tags;
        Ok(())
    })?;
    let message = if todo.tags.is_empty() {
        format!("Tags cleared: {}", todo.title)
    } else {
        format!("Tags set on {}: {}", todo.title, todo.tags.join(", "))
    };
    Ok(finish(todo, changes, message))
}
