use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{PinnedEntry, PinnedList, Todo};

/// New placement of one todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TodoPosition {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub position: usize,
}

/// New placement of one pinned entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPosition {
    pub id: Uuid,
    pub list_id: Uuid,
    pub position: usize,
}

/// New placement of one pinned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListPosition {
    pub id: Uuid,
    pub position: usize,
}

/// Every placement touched by a reorder.
///
/// A reorder always reports whole sibling groups: each group it touched is
/// listed completely, numbered `0..n-1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedPositions {
    pub todos: Vec<TodoPosition>,
    pub entries: Vec<EntryPosition>,
    pub lists: Vec<ListPosition>,
}

impl UpdatedPositions {
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty() && self.entries.is_empty() && self.lists.is_empty()
    }

    pub fn todo(&self, id: Uuid) -> Option<&TodoPosition> {
        self.todos.iter().find(|p| p.id == id)
    }

    pub fn entry(&self, id: Uuid) -> Option<&EntryPosition> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn list(&self, id: Uuid) -> Option<&ListPosition> {
        self.lists.iter().find(|p| p.id == id)
    }
}

/// One unit of change handed to [`super::TodoStore::commit`].
///
/// Removals run first, then upserts, then position updates. A store applies
/// the whole changeset or none of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub todos: Vec<Todo>,
    pub removed_todos: Vec<Uuid>,
    pub lists: Vec<PinnedList>,
    pub removed_lists: Vec<Uuid>,
    pub entries: Vec<PinnedEntry>,
    pub removed_entries: Vec<Uuid>,
    pub positions: UpdatedPositions,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: UpdatedPositions) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
            && self.removed_todos.is_empty()
            && self.lists.is_empty()
            && self.removed_lists.is_empty()
            && self.entries.is_empty()
            && self.removed_entries.is_empty()
            && self.positions.is_empty()
    }
}
