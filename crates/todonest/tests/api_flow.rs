mod common;

use std::io::Write;

use common::{assert_invariants, child_titles, init_logging, Builder};
use todonest::commands::get::TodoFilter;
use todonest::model::{PinnedEntry, PinnedList, Todo};
use todonest::store::memory::InMemoryStore;
use todonest::store::{Snapshot, TodoStore};
use todonest::tree::find_node;
use todonest::{EngineConfig, TodoApi, TodoError};
use uuid::Uuid;

/// confique picks the file format from the extension.
fn toml_file() -> tempfile::NamedTempFile {
    tempfile::Builder::new().suffix(".toml").tempfile().unwrap()
}

#[test]
fn test_config_file_drives_depth_limit_and_primary_title() {
    init_logging();
    let mut file = toml_file();
    writeln!(file, "max_depth = 1\nprimary_list_title = \"Главное\"").unwrap();
    let config = EngineConfig::load(Some(file.path())).unwrap();
    let mut api = TodoApi::new(InMemoryStore::new(), config);

    let root = api.create_todo("Root", None, &[]).unwrap().affected_todos[0].id;
    let child = api.create_todo("Child", Some(root), &[]).unwrap().affected_todos[0].id;
    let err = api.create_todo("Grandchild", Some(child), &[]).unwrap_err();
    assert!(matches!(err, TodoError::DepthExceeded(_)));

    api.toggle_pinned(child, true).unwrap();
    let lists = api.pinned_lists().unwrap().listed_lists;
    assert_eq!(lists[0].list.title, "Главное");
    assert_eq!(lists[0].todos[0].id, child);
}

#[test]
fn test_search_keeps_ancestors_of_hits() {
    let mut b = Builder::new()
        .root("Groceries")
        .child("Groceries", "Buy milk")
        .child("Groceries", "Bake bread")
        .root("Work")
        .child("Work", "Write report");
    b.api
        .set_tags(b.id("Bake bread"), &["Weekend".to_string()])
        .unwrap();

    let hits = b.api.search(&TodoFilter::query("buy mlk")).unwrap().listed_todos;
    assert_eq!(hits.len(), 1);
    let milk = find_node(&hits, b.id("Buy milk")).unwrap();
    let m = milk.matches.as_ref().unwrap();
    assert_eq!(m.ranges, vec![0..3, 4..8]);
    assert!(find_node(&hits, b.id("Bake bread")).is_none());

    let tagged = b
        .api
        .search(&TodoFilter::default().with_tags(["weekend"]))
        .unwrap()
        .listed_todos;
    assert_eq!(tagged[0].todo.title, "Groceries");
    assert_eq!(tagged[0].children.len(), 1);
    assert_eq!(tagged[0].children[0].todo.title, "Bake bread");

    let ranked = b
        .api
        .search_ranked(&TodoFilter::query("report"))
        .unwrap()
        .listed_todos;
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].children.is_empty());
}

#[test]
fn test_completion_is_independent_per_node() {
    let mut b = Builder::new().root("Trip").child("Trip", "Pack").child("Trip", "Book");

    b.api.toggle_completed(b.id("Trip")).unwrap();
    let snapshot = b.snapshot();
    assert!(snapshot.todo(b.id("Trip")).unwrap().completed);
    assert!(!snapshot.todo(b.id("Pack")).unwrap().completed);
    assert!(!snapshot.todo(b.id("Book")).unwrap().completed);

    b.api.set_completed(b.id("Trip"), false).unwrap();
    b.api.set_completed(b.id("Pack"), true).unwrap();
    b.api.set_completed(b.id("Book"), true).unwrap();
    assert!(!b.snapshot().todo(b.id("Trip")).unwrap().completed);
}

#[test]
fn test_delete_cascades_and_renumbers() {
    let mut b = Builder::new()
        .root("a")
        .child("a", "a1")
        .child("a1", "a1x")
        .root("b")
        .root("c");
    b.api.toggle_pinned(b.id("a1x"), true).unwrap();
    b.api.toggle_pinned(b.id("c"), true).unwrap();

    b.api.delete_todo(b.id("a")).unwrap();

    let snapshot = b.snapshot();
    assert_eq!(snapshot.todo_count(), 2);
    assert_eq!(child_titles(&snapshot, None), vec!["b", "c"]);
    assert_eq!(snapshot.todo(b.id("b")).unwrap().position, 0);
    let primary = snapshot.primary_list().unwrap();
    let entries = snapshot.entries(primary.id);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].todo_id, b.id("c"));
    assert_eq!(entries[0].position, 0);
    assert_invariants(&snapshot, 3);
}

#[test]
fn test_primary_list_survives_rename_and_delete_attempts() {
    let mut b = Builder::new();
    let primary = b.api.pinned_lists().unwrap().listed_lists[0].list.id;

    b.api.rename_pinned_list(primary, "Today").unwrap();
    let err = b.api.delete_pinned_list(primary).unwrap_err();
    assert!(matches!(err, TodoError::InvalidOperation(_)));
    let err = b.api.delete_pinned_list(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, TodoError::NotFound(_)));

    let snapshot = b.snapshot();
    let list = snapshot.primary_list().unwrap();
    assert_eq!(list.id, primary);
    assert_eq!(list.title, "Today");
}

#[test]
fn test_doctor_repairs_dirty_snapshot() {
    init_logging();
    let root = Todo::new("root".into(), None, 4);
    let orphan = Todo::new("orphan".into(), Some(Uuid::new_v4()), 0);
    let mut stale = Todo::new("stale pin".into(), Some(root.id), 2);
    stale.pinned = true;
    let list = PinnedList::new("Errands".into(), 3, false);
    let entry = PinnedEntry::new(list.id, orphan.id, 5);
    let snapshot = Snapshot::from_records(
        [root.clone(), orphan.clone(), stale.clone()],
        [list.clone()],
        [entry],
    );

    let mut api = TodoApi::new(InMemoryStore::with_snapshot(snapshot), EngineConfig::default());
    let tree = api.tree().unwrap().listed_todos;
    assert_eq!(tree.len(), 1);

    let result = api.doctor().unwrap();
    assert!(!result.changes.is_empty());

    let repaired = api.store().load().unwrap();
    assert_invariants(&repaired, 3);
    assert_eq!(repaired.todo(root.id).unwrap().position, 0);
    assert_eq!(repaired.todo(orphan.id).unwrap().parent_id, None);
    assert!(repaired.todo(orphan.id).unwrap().pinned);
    assert!(!repaired.todo(stale.id).unwrap().pinned);
    assert!(repaired.list(list.id).unwrap().is_primary);

    let again = api.doctor().unwrap();
    assert!(again.changes.is_empty());
    assert!(again.messages[0].content.contains("No inconsistencies"));
}

#[test]
fn test_failed_commit_leaves_store_untouched() {
    let b = Builder::new().root("a").root("b");
    let (id, before) = (b.id("b"), b.snapshot());
    let mut store = b.api.into_store();
    store.set_simulate_commit_error(true);
    let mut api = TodoApi::new(store, EngineConfig::default());

    let err = api.move_todo(id, None, 0).unwrap_err();
    assert!(matches!(err, TodoError::Store(_)));
    assert_eq!(api.store().snapshot(), &before);
}
