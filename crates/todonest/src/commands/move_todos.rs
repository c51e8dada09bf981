//! Reorder and reparent a todo together with its subtree.
//!
//! Preconditions are checked in a fixed order and the first failure wins:
//!
//! 1. the todo exists (`NotFound`)
//! 2. the target parent, when given, exists (`NotFound`)
//! 3. the todo is not its own target parent (`InvalidMove`)
//! 4. the target parent is not inside the todo's subtree (`InvalidMove`)
//! 5. `depth(target) + subtree_height(todo) <= max_depth` (`DepthExceeded`)
//!
//! The todo is then spliced out of its sibling group and into the target
//! group at the clamped index. Every touched group comes back numbered
//! `0..n-1`.

use uuid::Uuid;

use super::helpers::{require_todo, splice, todo_positions, without};
use crate::commands::CmdResult;
use crate::config::EngineConfig;
use crate::error::{Result, TodoError};
use crate::store::{Changeset, Snapshot, TodoStore, UpdatedPositions};

/// Computes the new placements for moving `id` under `target_parent` at
/// `target_index`. Negative or oversized indexes are clamped.
pub fn plan(
    snapshot: &Snapshot,
    config: &EngineConfig,
    id: Uuid,
    target_parent: Option<Uuid>,
    target_index: isize,
) -> Result<UpdatedPositions> {
    let todo = require_todo(snapshot, id)?;
    if let Some(parent) = target_parent {
        require_todo(snapshot, parent)?;
    }

    let forest = snapshot.forest();
    if let Some(parent) = target_parent {
        if parent == id {
            return Err(TodoError::InvalidMove(format!(
                "todo {id} cannot become its own parent"
            )));
        }
        if forest.is_descendant(id, parent) {
            return Err(TodoError::InvalidMove(format!(
                "todo {parent} is inside the subtree of {id}"
            )));
        }
    }

    let height = forest.subtree_height(id);
    let target_depth = match target_parent {
        Some(_) => forest.depth(target_parent) + 1,
        None => 0,
    };
    if target_depth + height > config.max_depth {
        return Err(TodoError::DepthExceeded(format!(
            "target depth {target_depth} plus subtree height {height} exceeds {}",
            config.max_depth
        )));
    }

    let source_parent = todo.parent_id;
    let mut positions = UpdatedPositions::default();
    if source_parent == target_parent {
        let siblings = splice(forest.children(source_parent), id, target_index);
        positions.todos = todo_positions(&siblings, source_parent);
    } else {
        let remaining = without(forest.children(source_parent), id);
        let inserted = splice(forest.children(target_parent), id, target_index);
        positions.todos = todo_positions(&remaining, source_parent);
        positions.todos.extend(todo_positions(&inserted, target_parent));
    }

    log::debug!(
        "move {id}: {:?} -> {:?} at {target_index}, {} position(s) renumbered",
        source_parent,
        target_parent,
        positions.todos.len()
    );
    Ok(positions)
}

pub fn run<S: TodoStore>(
    store: &mut S,
    config: &EngineConfig,
    id: Uuid,
    target_parent: Option<Uuid>,
    target_index: isize,
) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let positions = plan(&snapshot, config, id, target_parent, target_index)?;
    let changes = Changeset::from_positions(positions);
    store.commit(&changes)?;

    let after = store.load()?;
    let moved = require_todo(&after, id)?.clone();
    Ok(CmdResult::default()
        .with_changes(changes)
        .with_affected_todos(vec![moved]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::TodoPosition;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn order(positions: &UpdatedPositions, parent: Option<Uuid>) -> Vec<Uuid> {
        let mut group: Vec<&TodoPosition> = positions
            .todos
            .iter()
            .filter(|p| p.parent_id == parent)
            .collect();
        group.sort_by_key(|p| p.position);
        group.iter().map(|p| p.id).collect()
    }

    fn roots_abc() -> StoreFixture {
        StoreFixture::new()
            .with_root("a")
            .with_root("b")
            .with_root("c")
    }

    #[test]
    fn test_move_last_root_to_front() {
        let f = roots_abc();
        let positions = plan(&f.snapshot(), &config(), f.id("c"), None, 0).unwrap();
        assert_eq!(order(&positions, None), vec![f.id("c"), f.id("a"), f.id("b")]);
        assert_eq!(positions.todo(f.id("c")).unwrap().position, 0);
        assert_eq!(positions.todo(f.id("b")).unwrap().position, 2);
    }

    #[test]
    fn test_index_is_clamped() {
        let f = roots_abc();
        let snapshot = f.snapshot();
        let high = plan(&snapshot, &config(), f.id("a"), None, 42).unwrap();
        assert_eq!(order(&high, None), vec![f.id("b"), f.id("c"), f.id("a")]);
        let low = plan(&snapshot, &config(), f.id("c"), None, -3).unwrap();
        assert_eq!(order(&low, None), vec![f.id("c"), f.id("a"), f.id("b")]);
    }

    #[test]
    fn test_move_to_current_place_is_noop() {
        let f = roots_abc();
        let snapshot = f.snapshot();
        let positions = plan(&snapshot, &config(), f.id("b"), None, 1).unwrap();
        for p in &positions.todos {
            let todo = snapshot.todo(p.id).unwrap();
            assert_eq!((todo.parent_id, todo.position), (p.parent_id, p.position));
        }
    }

    #[test]
    fn test_reparent_renumbers_both_groups() {
        let f = roots_abc().with_child("c", "c1").with_child("c", "c2");
        let positions = plan(&f.snapshot(), &config(), f.id("a"), Some(f.id("c")), 1).unwrap();

        assert_eq!(order(&positions, None), vec![f.id("b"), f.id("c")]);
        assert_eq!(
            order(&positions, Some(f.id("c"))),
            vec![f.id("c1"), f.id("a"), f.id("c2")]
        );
        assert_eq!(positions.todos.len(), 5);
    }

    #[test]
    fn test_missing_todo_is_not_found() {
        let f = roots_abc();
        let err = plan(&f.snapshot(), &config(), Uuid::new_v4(), None, 0).unwrap_err();
        assert!(matches!(err, TodoError::NotFound(_)));
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let f = roots_abc();
        let err = plan(&f.snapshot(), &config(), f.id("a"), Some(Uuid::new_v4()), 0).unwrap_err();
        assert!(matches!(err, TodoError::NotFound(_)));
    }

    #[test]
    fn test_self_parenting_is_invalid() {
        let f = roots_abc();
        let err = plan(&f.snapshot(), &config(), f.id("a"), Some(f.id("a")), 0).unwrap_err();
        assert!(matches!(err, TodoError::InvalidMove(_)));
    }

    #[test]
    fn test_move_into_own_subtree_is_invalid() {
        let f = roots_abc().with_child("a", "a1").with_child("a1", "a1x");
        let err = plan(&f.snapshot(), &config(), f.id("a"), Some(f.id("a1x")), 0).unwrap_err();
        assert!(matches!(err, TodoError::InvalidMove(_)));
    }

    #[test]
    fn test_cycle_wins_over_depth() {
        // a -> a1 -> a2 -> a3 is at max depth; moving a below a3 is both a
        // cycle and too deep, and the cycle is reported
        let f = StoreFixture::new()
            .with_root("a")
            .with_child("a", "a1")
            .with_child("a1", "a2")
            .with_child("a2", "a3");
        let err = plan(&f.snapshot(), &config(), f.id("a"), Some(f.id("a3")), 0).unwrap_err();
        assert!(matches!(err, TodoError::InvalidMove(_)));
    }

    #[test]
    fn test_depth_exceeded_counts_subtree_height() {
        // x sits at depth 2 with one child; p sits at depth 2
        let f = StoreFixture::new()
            .with_root("r")
            .with_child("r", "m")
            .with_child("m", "x")
            .with_child("x", "x1")
            .with_root("s")
            .with_child("s", "n")
            .with_child("n", "p");
        let err = plan(&f.snapshot(), &config(), f.id("x"), Some(f.id("p")), 0).unwrap_err();
        assert!(matches!(err, TodoError::DepthExceeded(_)));

        // a leaf fits at depth 3
        let ok = plan(&f.snapshot(), &config(), f.id("x1"), Some(f.id("p")), 0);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_configured_depth_is_honored() {
        let f = roots_abc();
        let flat = EngineConfig {
            max_depth: 0,
            ..Default::default()
        };
        let err = plan(&f.snapshot(), &flat, f.id("a"), Some(f.id("b")), 0).unwrap_err();
        assert!(matches!(err, TodoError::DepthExceeded(_)));
    }

    #[test]
    fn test_run_commits_and_returns_moved_todo() {
        let f = roots_abc();
        let mut store = f.store();
        let result = run(&mut store, &config(), f.id("a"), Some(f.id("b")), 0).unwrap();

        assert_eq!(store.revision(), 1);
        assert_eq!(result.affected_todos[0].parent_id, Some(f.id("b")));
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.todo(f.id("c")).unwrap().position, 1);
    }

    #[test]
    fn test_failed_move_writes_nothing() {
        let f = roots_abc();
        let mut store = f.store();
        let before = store.load().unwrap();
        assert!(run(&mut store, &config(), f.id("a"), Some(f.id("a")), 0).is_err());
        assert_eq!(store.revision(), 0);
        assert_eq!(store.load().unwrap(), before);
    }
}
