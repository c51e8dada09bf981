use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::changeset::Changeset;
use crate::error::{Result, TodoError};
use crate::model::{PinnedEntry, PinnedList, Todo};
use crate::tree::Forest;

/// A consistent, owned view of every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    todos: HashMap<Uuid, Todo>,
    lists: HashMap<Uuid, PinnedList>,
    entries: HashMap<Uuid, PinnedEntry>,
}

pub(crate) fn list_order(a: &PinnedList, b: &PinnedList) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub(crate) fn entry_order(a: &PinnedEntry, b: &PinnedEntry) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.pinned_at.cmp(&b.pinned_at))
        .then_with(|| a.id.cmp(&b.id))
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw records without checking them. Dirty input
    /// is accepted here so that `doctor` can inspect and repair it.
    pub fn from_records(
        todos: impl IntoIterator<Item = Todo>,
        lists: impl IntoIterator<Item = PinnedList>,
        entries: impl IntoIterator<Item = PinnedEntry>,
    ) -> Self {
        Self {
            todos: todos.into_iter().map(|t| (t.id, t)).collect(),
            lists: lists.into_iter().map(|l| (l.id, l)).collect(),
            entries: entries.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    pub fn todo(&self, id: Uuid) -> Option<&Todo> {
        self.todos.get(&id)
    }

    pub fn todos(&self) -> impl Iterator<Item = &Todo> {
        self.todos.values()
    }

    pub fn todo_count(&self) -> usize {
        self.todos.len()
    }

    pub fn list(&self, id: Uuid) -> Option<&PinnedList> {
        self.lists.get(&id)
    }

    /// All pinned lists in display order.
    pub fn lists(&self) -> Vec<&PinnedList> {
        let mut lists: Vec<&PinnedList> = self.lists.values().collect();
        lists.sort_by(|a, b| list_order(a, b));
        lists
    }

    /// The list flagged primary. With dirty data carrying several flags, the
    /// first in display order wins.
    pub fn primary_list(&self) -> Option<&PinnedList> {
        self.lists().into_iter().find(|l| l.is_primary)
    }

    pub fn entry(&self, id: Uuid) -> Option<&PinnedEntry> {
        self.entries.get(&id)
    }

    pub fn all_entries(&self) -> impl Iterator<Item = &PinnedEntry> {
        self.entries.values()
    }

    /// Entries of one list in display order.
    pub fn entries(&self, list_id: Uuid) -> Vec<&PinnedEntry> {
        let mut entries: Vec<&PinnedEntry> = self
            .entries
            .values()
            .filter(|e| e.list_id == list_id)
            .collect();
        entries.sort_by(|a, b| entry_order(a, b));
        entries
    }

    /// The entry pinning `todo_id`, if any.
    pub fn entry_for(&self, todo_id: Uuid) -> Option<&PinnedEntry> {
        self.entries
            .values()
            .filter(|e| e.todo_id == todo_id)
            .min_by(|a, b| entry_order(a, b))
    }

    pub fn forest(&self) -> Forest<'_> {
        Forest::build(self.todos.values())
    }

    /// Applies `changes` as one unit: either every record changes or the
    /// snapshot is left untouched.
    pub fn apply(&mut self, changes: &Changeset) -> Result<()> {
        let mut staged = self.clone();
        staged.apply_in_place(changes)?;
        staged.check_changes(changes)?;
        *self = staged;
        Ok(())
    }

    fn apply_in_place(&mut self, changes: &Changeset) -> Result<()> {
        for id in &changes.removed_entries {
            self.entries.remove(id);
        }
        for id in &changes.removed_lists {
            self.lists.remove(id);
        }
        for id in &changes.removed_todos {
            self.todos.remove(id);
        }

        for todo in &changes.todos {
            self.todos.insert(todo.id, todo.clone());
        }
        for list in &changes.lists {
            self.lists.insert(list.id, list.clone());
        }
        for entry in &changes.entries {
            self.entries.insert(entry.id, entry.clone());
        }

        for p in &changes.positions.todos {
            let todo = self
                .todos
                .get_mut(&p.id)
                .ok_or_else(|| TodoError::NotFound(format!("todo {}", p.id)))?;
            todo.parent_id = p.parent_id;
            todo.position = p.position;
        }
        for p in &changes.positions.entries {
            let entry = self
                .entries
                .get_mut(&p.id)
                .ok_or_else(|| TodoError::NotFound(format!("pinned entry {}", p.id)))?;
            entry.list_id = p.list_id;
            entry.position = p.position;
        }
        for p in &changes.positions.lists {
            let list = self
                .lists
                .get_mut(&p.id)
                .ok_or_else(|| TodoError::NotFound(format!("pinned list {}", p.id)))?;
            list.position = p.position;
        }
        Ok(())
    }

    /// Referential checks over the records a changeset touched.
    fn check_changes(&self, changes: &Changeset) -> Result<()> {
        let broken = |what: String| Err(TodoError::InvalidOperation(what));

        let touched_todos: HashSet<Uuid> = changes
            .todos
            .iter()
            .map(|t| t.id)
            .chain(changes.positions.todos.iter().map(|p| p.id))
            .filter(|id| self.todos.contains_key(id))
            .collect();
        for id in &touched_todos {
            if let Some(parent) = self.todos[id].parent_id {
                if !self.todos.contains_key(&parent) {
                    return broken(format!("todo {id} points at missing parent {parent}"));
                }
                if self.reaches_itself(*id) {
                    return broken(format!("todo {id} would become its own ancestor"));
                }
            }
        }

        let removed_todos: HashSet<&Uuid> = changes.removed_todos.iter().collect();
        if let Some(child) = self
            .todos
            .values()
            .find(|t| t.parent_id.is_some_and(|p| removed_todos.contains(&p)))
        {
            return broken(format!("todo {} is left without its parent", child.id));
        }

        let removed_lists: HashSet<&Uuid> = changes.removed_lists.iter().collect();
        for entry in self.entries.values() {
            if removed_todos.contains(&entry.todo_id) || removed_lists.contains(&entry.list_id) {
                return broken(format!("pinned entry {} is left dangling", entry.id));
            }
        }

        let touched_entries: HashSet<Uuid> = changes
            .entries
            .iter()
            .map(|e| e.id)
            .chain(changes.positions.entries.iter().map(|p| p.id))
            .filter(|id| self.entries.contains_key(id))
            .collect();
        for id in &touched_entries {
            let entry = &self.entries[id];
            if !self.lists.contains_key(&entry.list_id) {
                return broken(format!("pinned entry {id} points at missing list"));
            }
            if !self.todos.contains_key(&entry.todo_id) {
                return broken(format!("pinned entry {id} points at missing todo"));
            }
            let pins = self
                .entries
                .values()
                .filter(|e| e.todo_id == entry.todo_id)
                .count();
            if pins > 1 {
                return broken(format!("todo {} would be pinned twice", entry.todo_id));
            }
        }

        if changes.lists.iter().any(|l| l.is_primary)
            && self.lists.values().filter(|l| l.is_primary).count() > 1
        {
            return broken("more than one primary list".to_string());
        }
        Ok(())
    }

    fn reaches_itself(&self, id: Uuid) -> bool {
        let mut seen = HashSet::new();
        let mut current = id;
        while let Some(parent) = self.todos.get(&current).and_then(|t| t.parent_id) {
            if parent == id {
                return true;
            }
            if !seen.insert(parent) {
                return false;
            }
            current = parent;
        }
        false
    }
}
