//! Pinning: membership of todos in pinned lists.
//!
//! A pinned todo has exactly one entry. Pinning appends the todo to the
//! primary list, creating that list on first use. Unpinning removes the
//! entry and closes the gap it left.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::helpers::{entry_ids, entry_positions, require_list, require_todo, splice, without};
use super::lists::ensure_primary;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::EngineConfig;
use crate::error::{Result, TodoError};
use crate::model::PinnedEntry;
use crate::store::{Changeset, Snapshot, TodoStore, UpdatedPositions};

/// Computes the change for setting the pinned state of `id`.
pub fn plan_toggle(
    snapshot: &Snapshot,
    config: &EngineConfig,
    id: Uuid,
    pinned: bool,
) -> Result<Changeset> {
    let todo = require_todo(snapshot, id)?;
    let mut changes = Changeset::new();

    if pinned {
        let (primary_id, created) = ensure_primary(snapshot, config);
        let primary_entries = entry_ids(snapshot, primary_id);
        if let Some(list) = created {
            changes.lists.push(list);
        }

        match snapshot.entry_for(id) {
            Some(entry) if entry.list_id == primary_id => {}
            Some(entry) => {
                let remaining = without(&entry_ids(snapshot, entry.list_id), entry.id);
                let mut target = primary_entries;
                target.push(entry.id);
                changes.positions.entries = entry_positions(&remaining, entry.list_id);
                changes
                    .positions
                    .entries
                    .extend(entry_positions(&target, primary_id));
            }
            None => {
                changes
                    .entries
                    .push(PinnedEntry::new(primary_id, id, primary_entries.len()));
            }
        }
    } else {
        let pins: Vec<_> = snapshot.all_entries().filter(|e| e.todo_id == id).collect();
        let lists: BTreeSet<Uuid> = pins.iter().map(|e| e.list_id).collect();
        for list_id in lists {
            let remaining: Vec<Uuid> = entry_ids(snapshot, list_id)
                .into_iter()
                .filter(|entry_id| pins.iter().all(|p| p.id != *entry_id))
                .collect();
            changes
                .positions
                .entries
                .extend(entry_positions(&remaining, list_id));
        }
        changes.removed_entries = pins.iter().map(|e| e.id).collect();
    }

    if todo.pinned != pinned {
        let mut updated = todo.clone();
        updated.pinned = pinned;
        updated.touch();
        changes.todos.push(updated);
    }

    log::debug!("set pinned={pinned} on {id}");
    Ok(changes)
}

pub fn toggle<S: TodoStore>(
    store: &mut S,
    config: &EngineConfig,
    id: Uuid,
    pinned: bool,
) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let changes = plan_toggle(&snapshot, config, id, pinned)?;
    store.commit(&changes)?;

    let after = store.load()?;
    let todo = require_todo(&after, id)?.clone();
    let mut result = CmdResult::default().with_changes(changes);
    let verb = if pinned { "Pinned" } else { "Unpinned" };
    result.add_message(CmdMessage::success(format!("{verb}: {}", todo.title)));
    Ok(result.with_affected_todos(vec![todo]))
}

pub fn pin<S: TodoStore>(store: &mut S, config: &EngineConfig, id: Uuid) -> Result<CmdResult> {
    toggle(store, config, id, true)
}

pub fn unpin<S: TodoStore>(store: &mut S, config: &EngineConfig, id: Uuid) -> Result<CmdResult> {
    toggle(store, config, id, false)
}

/// Computes new entry placements for moving the entry of `todo_id` into
/// `list_id` at `target_index` (clamped).
pub fn plan_move(
    snapshot: &Snapshot,
    todo_id: Uuid,
    list_id: Uuid,
    target_index: isize,
) -> Result<UpdatedPositions> {
    require_list(snapshot, list_id)?;
    let entry = snapshot
        .entry_for(todo_id)
        .ok_or_else(|| TodoError::NotFound(format!("todo {todo_id} is not pinned")))?;

    let mut positions = UpdatedPositions::default();
    if entry.list_id == list_id {
        let order = splice(&entry_ids(snapshot, list_id), entry.id, target_index);
        positions.entries = entry_positions(&order, list_id);
    } else {
        let remaining = without(&entry_ids(snapshot, entry.list_id), entry.id);
        let inserted = splice(&entry_ids(snapshot, list_id), entry.id, target_index);
        positions.entries = entry_positions(&remaining, entry.list_id);
        positions
            .entries
            .extend(entry_positions(&inserted, list_id));
    }

    log::debug!(
        "move pinned {todo_id}: list {} -> {list_id} at {target_index}",
        entry.list_id
    );
    Ok(positions)
}

pub fn move_entry<S: TodoStore>(
    store: &mut S,
    todo_id: Uuid,
    list_id: Uuid,
    target_index: isize,
) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let positions = plan_move(&snapshot, todo_id, list_id, target_index)?;
    let changes = Changeset::from_positions(positions);
    store.commit(&changes)?;
    Ok(CmdResult::default().with_changes(changes))
}
