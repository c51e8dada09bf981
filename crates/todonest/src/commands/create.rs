use uuid::Uuid;

use super::helpers::require_todo;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::EngineConfig;
use crate::error::{Result, TodoError};
use crate::model::{normalize_title, Todo};
use crate::store::{Changeset, Snapshot, TodoStore};
use crate::tags::normalize_tags;

/// Builds a new todo appended to the end of its sibling group.
pub fn plan(
    snapshot: &Snapshot,
    config: &EngineConfig,
    title: &str,
    parent_id: Option<Uuid>,
    tags: &[String],
) -> Result<Todo> {
    let title = normalize_title(title)?;
    let tags = normalize_tags(tags)?;

    if let Some(parent) = parent_id {
        require_todo(snapshot, parent)?;
    }
    let forest = snapshot.forest();
    let depth = match parent_id {
        Some(_) => forest.depth(parent_id) + 1,
        None => 0,
    };
    if depth > config.max_depth {
        return Err(TodoError::DepthExceeded(format!(
            "a child here would sit at depth {depth}, the limit is {}",
            config.max_depth
        )));
    }

    let mut todo = Todo::new(title, parent_id, forest.children(parent_id).len());
    todo.tags = tags;
    Ok(todo)
}

pub fn run<S: TodoStore>(
    store: &mut S,
    config: &EngineConfig,
    title: &str,
    parent_id: Option<Uuid>,
    tags: &[String],
) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let todo = plan(&snapshot, config, title, parent_id, tags)?;
    let changes = Changeset {
        todos: vec![todo.clone()],
        ..Default::default()
    };
    store.commit(&changes)?;
    log::debug!("created todo {} under {:?}", todo.id, parent_id);

    let mut result = CmdResult::default().with_changes(changes);
    result.add_message(CmdMessage::success(format!("Todo created: {}", todo.title)));
    Ok(result.with_affected_todos(vec![todo]))
}
