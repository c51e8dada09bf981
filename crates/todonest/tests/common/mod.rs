#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};

use todonest::store::memory::InMemoryStore;
use todonest::store::Snapshot;
use todonest::{EngineConfig, TodoApi};
use uuid::Uuid;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn api() -> TodoApi<InMemoryStore> {
    init_logging();
    TodoApi::new(InMemoryStore::new(), EngineConfig::default())
}

/// Creates todos through the API and remembers their ids by title.
pub struct Builder {
    pub api: TodoApi<InMemoryStore>,
    pub ids: HashMap<String, Uuid>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            api: api(),
            ids: HashMap::new(),
        }
    }

    pub fn root(mut self, title: &str) -> Self {
        let id = self.api.create_todo(title, None, &[]).unwrap().affected_todos[0].id;
        self.ids.insert(title.to_string(), id);
        self
    }

    pub fn child(mut self, parent: &str, title: &str) -> Self {
        let parent = self.id(parent);
        let id = self
            .api
            .create_todo(title, Some(parent), &[])
            .unwrap()
            .affected_todos[0]
            .id;
        self.ids.insert(title.to_string(), id);
        self
    }

    pub fn id(&self, title: &str) -> Uuid {
        self.ids[title]
    }

    pub fn snapshot(&self) -> Snapshot {
        self.api.store().snapshot().clone()
    }
}

/// Titles of the children of `parent` in display order.
pub fn child_titles(snapshot: &Snapshot, parent: Option<Uuid>) -> Vec<String> {
    let forest = snapshot.forest();
    forest
        .children(parent)
        .iter()
        .map(|id| forest.get(*id).unwrap().title.clone())
        .collect()
}

/// Panics with a description of the first broken invariant.
pub fn assert_invariants(snapshot: &Snapshot, max_depth: usize) {
    let forest = snapshot.forest();

    let mut groups: BTreeMap<Option<Uuid>, Vec<usize>> = BTreeMap::new();
    for todo in snapshot.todos() {
        if let Some(parent) = todo.parent_id {
            assert!(snapshot.todo(parent).is_some(), "dangling parent on {}", todo.title);
        }
        assert!(
            !forest.is_descendant(todo.id, todo.id),
            "{} is its own descendant",
            todo.title
        );
        assert!(
            !forest.ancestors(todo.id).contains(&todo.id),
            "{} is its own ancestor",
            todo.title
        );
        assert!(
            forest.depth(Some(todo.id)) + forest.subtree_height(todo.id) <= max_depth,
            "{} nests too deep",
            todo.title
        );
        groups.entry(todo.parent_id).or_default().push(todo.position);
    }
    assert!(forest.unreachable().is_empty(), "unreachable todos");
    for (parent, mut positions) in groups {
        positions.sort_unstable();
        assert_eq!(
            positions,
            (0..positions.len()).collect::<Vec<_>>(),
            "sibling group under {parent:?} is not contiguous"
        );
    }

    let mut pinned = HashSet::new();
    for entry in snapshot.all_entries() {
        assert!(snapshot.list(entry.list_id).is_some(), "entry without list");
        assert!(snapshot.todo(entry.todo_id).is_some(), "entry without todo");
        assert!(pinned.insert(entry.todo_id), "todo pinned twice");
    }
    for todo in snapshot.todos() {
        assert_eq!(todo.pinned, pinned.contains(&todo.id), "pinned flag of {}", todo.title);
    }

    let lists = snapshot.lists();
    if !lists.is_empty() {
        assert_eq!(lists.iter().filter(|l| l.is_primary).count(), 1);
    }
    let list_positions: Vec<usize> = lists.iter().map(|l| l.position).collect();
    assert_eq!(list_positions, (0..lists.len()).collect::<Vec<_>>());
    for list in lists {
        let positions: Vec<usize> = snapshot.entries(list.id).iter().map(|e| e.position).collect();
        assert_eq!(positions, (0..positions.len()).collect::<Vec<_>>());
    }
}
