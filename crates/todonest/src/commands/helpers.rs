use uuid::Uuid;

use crate::error::{Result, TodoError};
use crate::model::{PinnedList, Todo};
use crate::store::{EntryPosition, ListPosition, Snapshot, TodoPosition};

pub fn require_todo(snapshot: &Snapshot, id: Uuid) -> Result<&Todo> {
    snapshot
        .todo(id)
        .ok_or_else(|| TodoError::NotFound(format!("todo {id}")))
}

pub fn require_list(snapshot: &Snapshot, id: Uuid) -> Result<&PinnedList> {
    snapshot
        .list(id)
        .ok_or_else(|| TodoError::NotFound(format!("pinned list {id}")))
}

/// Clamps a requested insertion index into `0..=len`.
pub fn clamp_index(index: isize, len: usize) -> usize {
    usize::try_from(index).map_or(0, |i| i.min(len))
}

/// Removes `id` from `ids` (if present) and reinserts it at `index`, clamped
/// against the list without `id`.
pub fn splice(ids: &[Uuid], id: Uuid, index: isize) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = ids.iter().copied().filter(|x| *x != id).collect();
    let at = clamp_index(index, out.len());
    out.insert(at, id);
    out
}

/// `ids` without `id`.
pub fn without(ids: &[Uuid], id: Uuid) -> Vec<Uuid> {
    ids.iter().copied().filter(|x| *x != id).collect()
}

/// Numbers a sibling group `0..n-1` under `parent_id`.
pub fn todo_positions(ids: &[Uuid], parent_id: Option<Uuid>) -> Vec<TodoPosition> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| TodoPosition {
            id: *id,
            parent_id,
            position,
        })
        .collect()
}

/// Numbers the entries of one list `0..n-1`.
pub fn entry_positions(ids: &[Uuid], list_id: Uuid) -> Vec<EntryPosition> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| EntryPosition {
            id: *id,
            list_id,
            position,
        })
        .collect()
}

pub fn list_positions(ids: &[Uuid]) -> Vec<ListPosition> {
    ids.iter()
        .enumerate()
        .map(|(position, id)| ListPosition { id: *id, position })
        .collect()
}

/// Entry ids of one list in display order.
pub fn entry_ids(snapshot: &Snapshot, list_id: Uuid) -> Vec<Uuid> {
    snapshot.entries(list_id).iter().map(|e| e.id).collect()
}

/// All list ids in display order.
pub fn list_ids(snapshot: &Snapshot) -> Vec<Uuid> {
    snapshot.lists().iter().map(|l| l.id).collect()
}
