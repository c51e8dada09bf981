use super::{Changeset, Snapshot, TodoStore};
use crate::error::{Result, TodoError};

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshot: Snapshot,
    revision: u64,
    simulate_commit_error: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }

    /// Number of successful commits so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Enable commit failure simulation for testing error handling.
    pub fn set_simulate_commit_error(&mut self, simulate: bool) {
        self.simulate_commit_error = simulate;
    }
}

impl TodoStore for InMemoryStore {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn commit(&mut self, changes: &Changeset) -> Result<()> {
        if self.simulate_commit_error {
            return Err(TodoError::Store("Simulated commit error".to_string()));
        }
        if changes.is_empty() {
            return Ok(());
        }
        self.snapshot.apply(changes)?;
        self.revision += 1;
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use std::collections::HashMap;

    use uuid::Uuid;

    use super::*;
    use crate::model::{PinnedEntry, PinnedList, Todo};

    /// Builds a store from named records. Positions are assigned in call
    /// order, so the fixture always starts out well formed.
    #[derive(Default)]
    pub struct StoreFixture {
        todos: Vec<Todo>,
        lists: Vec<PinnedList>,
        entries: Vec<PinnedEntry>,
        names: HashMap<String, Uuid>,
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_root(self, name: &str) -> Self {
            self.with_todo(name, None)
        }

        pub fn with_child(self, parent: &str, name: &str) -> Self {
            let parent_id = self.id(parent);
            self.with_todo(name, Some(parent_id))
        }

        fn with_todo(mut self, name: &str, parent_id: Option<Uuid>) -> Self {
            let position = self
                .todos
                .iter()
                .filter(|t| t.parent_id == parent_id)
                .count();
            let todo = Todo::new(name.to_string(), parent_id, position);
            self.names.insert(name.to_string(), todo.id);
            self.todos.push(todo);
            self
        }

        pub fn with_list(mut self, name: &str, is_primary: bool) -> Self {
            let list = PinnedList::new(name.to_string(), self.lists.len(), is_primary);
            self.names.insert(name.to_string(), list.id);
            self.lists.push(list);
            self
        }

        pub fn with_pin(mut self, list: &str, todo: &str) -> Self {
            let list_id = self.id(list);
            let todo_id = self.id(todo);
            let position = self.entries.iter().filter(|e| e.list_id == list_id).count();
            self.entries
                .push(PinnedEntry::new(list_id, todo_id, position));
            if let Some(t) = self.todos.iter_mut().find(|t| t.id == todo_id) {
                t.pinned = true;
            }
            self
        }

        pub fn id(&self, name: &str) -> Uuid {
            *self
                .names
                .get(name)
                .unwrap_or_else(|| panic!("no fixture record named {name}"))
        }

        pub fn snapshot(&self) -> Snapshot {
            Snapshot::from_records(
                self.todos.clone(),
                self.lists.clone(),
                self.entries.clone(),
            )
        }

        pub fn store(&self) -> InMemoryStore {
            InMemoryStore::with_snapshot(self.snapshot())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use crate::model::Todo;

    #[test]
    fn test_commit_applies_and_bumps_revision() {
        let mut store = InMemoryStore::new();
        let todo = Todo::new("Root".into(), None, 0);
        let changes = Changeset {
            todos: vec![todo.clone()],
            ..Default::default()
        };

        store.commit(&changes).unwrap();
        assert_eq!(store.revision(), 1);
        assert_eq!(store.load().unwrap().todo(todo.id), Some(&todo));
    }

    #[test]
    fn test_empty_commit_is_noop() {
        let mut store = InMemoryStore::new();
        store.commit(&Changeset::new()).unwrap();
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_simulated_commit_error() {
        let mut store = StoreFixture::new().with_root("a").store();
        store.set_simulate_commit_error(true);
        let changes = Changeset {
            todos: vec![Todo::new("b".into(), None, 1)],
            ..Default::default()
        };

        let err = store.commit(&changes).unwrap_err();
        assert!(matches!(err, TodoError::Store(_)));
        assert_eq!(store.snapshot().todo_count(), 1);
    }

    #[test]
    fn test_fixture_assigns_positions_in_order() {
        let fixture = StoreFixture::new()
            .with_root("a")
            .with_root("b")
            .with_child("a", "a1")
            .with_child("a", "a2")
            .with_list("Primary", true)
            .with_pin("Primary", "a2")
            .with_pin("Primary", "b");
        let snapshot = fixture.snapshot();

        assert_eq!(snapshot.todo(fixture.id("b")).unwrap().position, 1);
        assert_eq!(snapshot.todo(fixture.id("a2")).unwrap().position, 1);
        assert!(snapshot.todo(fixture.id("a2")).unwrap().pinned);
        let pinned: Vec<_> = snapshot
            .entries(fixture.id("Primary"))
            .iter()
            .map(|e| e.todo_id)
            .collect();
        assert_eq!(pinned, vec![fixture.id("a2"), fixture.id("b")]);
    }
}
