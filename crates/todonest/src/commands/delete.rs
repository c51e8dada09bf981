use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use super::helpers::{entry_ids, entry_positions, require_todo, todo_positions, without};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{Changeset, Snapshot, TodoStore};

/// Removes `id`, its whole subtree and every pinned entry of those todos,
/// then closes the gaps left in the sibling group and in the pinned lists.
pub fn plan(snapshot: &Snapshot, id: Uuid) -> Result<Changeset> {
    let todo = require_todo(snapshot, id)?;
    let forest = snapshot.forest();
    let subtree = forest.subtree(id);
    let doomed: HashSet<Uuid> = subtree.iter().copied().collect();

    let mut changes = Changeset::new();
    let siblings = without(forest.children(todo.parent_id), id);
    changes.positions.todos = todo_positions(&siblings, todo.parent_id);

    let pins: Vec<_> = snapshot
        .all_entries()
        .filter(|e| doomed.contains(&e.todo_id))
        .collect();
    let removed_entries: HashSet<Uuid> = pins.iter().map(|e| e.id).collect();
    let lists: BTreeSet<Uuid> = pins.iter().map(|e| e.list_id).collect();
    for list_id in lists {
        let remaining: Vec<Uuid> = entry_ids(snapshot, list_id)
            .into_iter()
            .filter(|e| !removed_entries.contains(e))
            .collect();
        changes
            .positions
            .entries
            .extend(entry_positions(&remaining, list_id));
    }

    changes.removed_entries = removed_entries.into_iter().collect();
    changes.removed_todos = subtree;
    log::debug!(
        "delete {id}: {} todo(s), {} pinned entr(ies)",
        changes.removed_todos.len(),
        changes.removed_entries.len()
    );
    Ok(changes)
}

pub fn run<S: TodoStore>(store: &mut S, id: Uuid) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let changes = plan(&snapshot, id)?;
    store.commit(&changes)?;

    let title = snapshot.todo(id).map(|t| t.title.clone()).unwrap_or_default();
    let mut result = CmdResult::default();
    let removed = changes.removed_todos.len();
    if removed > 1 {
        result.add_message(CmdMessage::success(format!(
            "Todo deleted: {title} (with {} nested)",
            removed - 1
        )));
    } else {
        result.add_message(CmdMessage::success(format!("Todo deleted: {title}")));
    }
    Ok(result.with_changes(changes))
}
