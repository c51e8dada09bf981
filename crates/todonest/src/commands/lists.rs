//! Pinned list management.
//!
//! The primary list is created on demand by [`ensure_primary`] and is the
//! only list that cannot be deleted. Deleting any other list hands its
//! entries to the primary list's tail, in their original order.

use uuid::Uuid;

use super::helpers::{
    entry_ids, entry_positions, list_ids, list_positions, require_list, splice, without,
};
use crate::commands::{CmdMessage, CmdResult, PinnedListView};
use crate::config::EngineConfig;
use crate::error::{Result, TodoError};
use crate::model::{normalize_title, PinnedList};
use crate::store::{Changeset, Snapshot, TodoStore, UpdatedPositions};

/// Id of the primary list, plus the list to create when there is none yet.
/// A new primary list goes after any existing lists.
pub fn ensure_primary(snapshot: &Snapshot, config: &EngineConfig) -> (Uuid, Option<PinnedList>) {
    match snapshot.primary_list() {
        Some(list) => (list.id, None),
        None => {
            let list = PinnedList::new(
                config.primary_list_title.clone(),
                snapshot.lists().len(),
                true,
            );
            log::info!("creating primary pinned list '{}'", list.title);
            (list.id, Some(list))
        }
    }
}

/// Lists in display order with their todos in entry order.
pub fn views(snapshot: &Snapshot) -> Vec<PinnedListView> {
    snapshot
        .lists()
        .into_iter()
        .map(|list| PinnedListView {
            list: list.clone(),
            todos: snapshot
                .entries(list.id)
                .iter()
                .filter_map(|e| snapshot.todo(e.todo_id).cloned())
                .collect(),
        })
        .collect()
}

/// All pinned lists. Creates the primary list if it is missing.
pub fn list<S: TodoStore>(store: &mut S, config: &EngineConfig) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let (_, created) = ensure_primary(&snapshot, config);
    let Some(primary) = created else {
        return Ok(CmdResult::default().with_listed_lists(views(&snapshot)));
    };

    let changes = Changeset {
        lists: vec![primary],
        ..Default::default()
    };
    store.commit(&changes)?;
    let after = store.load()?;
    Ok(CmdResult::default()
        .with_changes(changes)
        .with_listed_lists(views(&after)))
}

pub fn plan_add(
    snapshot: &Snapshot,
    config: &EngineConfig,
    title: &str,
) -> Result<(PinnedList, Changeset)> {
    let title = normalize_title(title)?;
    let mut changes = Changeset::new();
    let (_, created) = ensure_primary(snapshot, config);
    changes.lists.extend(created);

    let position = snapshot.lists().len() + changes.lists.len();
    let list = PinnedList::new(title, position, false);
    changes.lists.push(list.clone());
    Ok((list, changes))
}

pub fn add<S: TodoStore>(store: &mut S, config: &EngineConfig, title: &str) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let (list, changes) = plan_add(&snapshot, config, title)?;
    store.commit(&changes)?;

    let mut result = CmdResult::default().with_changes(changes);
    result.add_message(CmdMessage::success(format!("Created list: {}", list.title)));
    let after = store.load()?;
    Ok(result.with_listed_lists(views(&after)))
}

/// Renames a list. The primary list keeps its flag under any title.
pub fn rename<S: TodoStore>(store: &mut S, id: Uuid, title: &str) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let mut list = require_list(&snapshot, id)?.clone();
    list.title = normalize_title(title)?;

    let changes = Changeset {
        lists: vec![list],
        ..Default::default()
    };
    store.commit(&changes)?;
    let after = store.load()?;
    Ok(CmdResult::default()
        .with_changes(changes)
        .with_listed_lists(views(&after)))
}

pub fn plan_move(snapshot: &Snapshot, id: Uuid, target_index: isize) -> Result<UpdatedPositions> {
    require_list(snapshot, id)?;
    let order = splice(&list_ids(snapshot), id, target_index);
    log::debug!("move pinned list {id} to {target_index}");
    Ok(UpdatedPositions {
        lists: list_positions(&order),
        ..Default::default()
    })
}

pub fn move_list<S: TodoStore>(store: &mut S, id: Uuid, target_index: isize) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let changes = Changeset::from_positions(plan_move(&snapshot, id, target_index)?);
    store.commit(&changes)?;
    let after = store.load()?;
    Ok(CmdResult::default()
        .with_changes(changes)
        .with_listed_lists(views(&after)))
}

/// Computes the deletion of a non-primary list.
pub fn plan_delete(snapshot: &Snapshot, config: &EngineConfig, id: Uuid) -> Result<Changeset> {
    let list = require_list(snapshot, id)?;
    if list.is_primary {
        return Err(TodoError::InvalidOperation(
            "the primary list cannot be deleted".to_string(),
        ));
    }

    let mut changes = Changeset::new();
    let (primary_id, created) = ensure_primary(snapshot, config);
    changes.lists.extend(created);

    let mut primary_entries = entry_ids(snapshot, primary_id);
    primary_entries.extend(entry_ids(snapshot, id));
    changes.positions.entries = entry_positions(&primary_entries, primary_id);

    let mut remaining = without(&list_ids(snapshot), id);
    if !remaining.contains(&primary_id) {
        remaining.push(primary_id);
    }
    changes.positions.lists = list_positions(&remaining);
    changes.removed_lists.push(id);

    log::debug!(
        "delete pinned list {id}: {} entr(ies) now in primary list",
        primary_entries.len()
    );
    Ok(changes)
}

pub fn delete<S: TodoStore>(store: &mut S, config: &EngineConfig, id: Uuid) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let title = require_list(&snapshot, id)?.title.clone();
    let changes = plan_delete(&snapshot, config, id)?;
    store.commit(&changes)?;

    let mut result = CmdResult::default().with_changes(changes);
    result.add_message(CmdMessage::success(format!("Deleted list: {title}")));
    let after = store.load()?;
    Ok(result.with_listed_lists(views(&after)))
}
