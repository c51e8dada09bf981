//! Consistency check and repair.
//!
//! Commands only ever produce well formed data, but a store may hand back
//! records written by something else. [`inspect`] lists every broken
//! invariant; [`plan_repair`] fixes what has a mechanical fix:
//!
//! - dangling and duplicate pinned entries are removed
//! - orphans and cycle members are re-rooted at the end of the roots
//! - sibling groups, list entries and lists are renumbered `0..n-1`
//! - `pinned` flags are made to mirror entry existence
//! - a missing primary flag goes to the first list, extra flags are cleared
//!
//! Depth overruns are reported only. Flattening them would silently change
//! the user's hierarchy.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use super::helpers::{entry_positions, list_positions};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{PinnedEntry, Todo};
use crate::store::snapshot::entry_order;
use crate::store::{Changeset, Snapshot, TodoPosition, TodoStore};
use crate::tree::{sibling_order, Forest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DoctorReport {
    /// Todos whose parent does not exist
    pub orphaned: Vec<Uuid>,
    /// Todos that are their own ancestor
    pub cycles: Vec<Uuid>,
    /// Parents (`None` = roots) whose children are not numbered `0..n-1`
    pub misnumbered_groups: Vec<Option<Uuid>>,
    /// Todos with `depth + subtree height` above the limit
    pub depth_overruns: Vec<Uuid>,
    /// Todos whose `pinned` flag disagrees with their entries
    pub pinned_mismatches: Vec<Uuid>,
    /// Entries pointing at a missing list or todo
    pub dangling_entries: Vec<Uuid>,
    /// Extra entries for an already pinned todo
    pub duplicate_entries: Vec<Uuid>,
    /// Lists whose entries are not numbered `0..n-1`
    pub misnumbered_lists: Vec<Uuid>,
    /// Whether the lists themselves are not numbered `0..n-1`
    pub list_order_broken: bool,
    /// Number of lists flagged primary. Zero is fine while there are no lists.
    pub primary_lists: usize,
    pub total_lists: usize,
}

impl DoctorReport {
    pub fn primary_broken(&self) -> bool {
        self.primary_lists > 1 || (self.primary_lists == 0 && self.total_lists > 0)
    }

    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty()
            && self.cycles.is_empty()
            && self.misnumbered_groups.is_empty()
            && self.depth_overruns.is_empty()
            && self.pinned_mismatches.is_empty()
            && self.dangling_entries.is_empty()
            && self.duplicate_entries.is_empty()
            && self.misnumbered_lists.is_empty()
            && !self.list_order_broken
            && !self.primary_broken()
    }
}

fn is_contiguous(mut positions: Vec<usize>) -> bool {
    positions.sort_unstable();
    positions.iter().enumerate().all(|(i, p)| i == *p)
}

fn reaches_itself(forest: &Forest<'_>, id: Uuid) -> bool {
    forest
        .get(id)
        .and_then(|t| t.parent_id)
        .is_some_and(|parent| parent == id || forest.is_descendant(id, parent))
}

/// Lists every broken invariant without changing anything.
pub fn inspect(snapshot: &Snapshot, config: &EngineConfig) -> DoctorReport {
    let forest = snapshot.forest();
    let mut todos: Vec<&Todo> = snapshot.todos().collect();
    todos.sort_by(|a, b| sibling_order(a, b));

    let mut report = DoctorReport::default();
    for todo in &todos {
        if todo.parent_id.is_some_and(|p| snapshot.todo(p).is_none()) {
            report.orphaned.push(todo.id);
        }
        if reaches_itself(&forest, todo.id) {
            report.cycles.push(todo.id);
        }
    }

    let mut groups: BTreeMap<Option<Uuid>, Vec<usize>> = BTreeMap::new();
    for todo in &todos {
        groups.entry(todo.parent_id).or_default().push(todo.position);
    }
    report.misnumbered_groups = groups
        .into_iter()
        .filter(|(_, positions)| !is_contiguous(positions.clone()))
        .map(|(parent, _)| parent)
        .collect();

    let unreachable: HashSet<Uuid> = forest.unreachable().into_iter().collect();
    report.depth_overruns = todos
        .iter()
        .filter(|t| !unreachable.contains(&t.id))
        .filter(|t| forest.depth(Some(t.id)) + forest.subtree_height(t.id) > config.max_depth)
        .map(|t| t.id)
        .collect();

    let (kept, dangling, duplicates) = sort_entries(snapshot);
    report.dangling_entries = dangling;
    report.duplicate_entries = duplicates;

    let pinned: HashSet<Uuid> = kept.iter().map(|e| e.todo_id).collect();
    report.pinned_mismatches = todos
        .iter()
        .filter(|t| t.pinned != pinned.contains(&t.id))
        .map(|t| t.id)
        .collect();

    let lists = snapshot.lists();
    report.total_lists = lists.len();
    report.primary_lists = lists.iter().filter(|l| l.is_primary).count();
    report.list_order_broken = !is_contiguous(lists.iter().map(|l| l.position).collect());
    report.misnumbered_lists = lists
        .iter()
        .filter(|l| !is_contiguous(snapshot.entries(l.id).iter().map(|e| e.position).collect()))
        .map(|l| l.id)
        .collect();

    report
}

/// Splits entries into (kept, dangling ids, duplicate ids). For a todo
/// pinned more than once the first entry in list and entry order is kept.
fn sort_entries(snapshot: &Snapshot) -> (Vec<&PinnedEntry>, Vec<Uuid>, Vec<Uuid>) {
    let mut kept = Vec::new();
    let mut dangling = Vec::new();
    let mut duplicates = Vec::new();
    let mut seen = HashSet::new();

    let mut orphans: Vec<&PinnedEntry> = snapshot
        .all_entries()
        .filter(|e| snapshot.list(e.list_id).is_none())
        .collect();
    orphans.sort_by(|a, b| entry_order(a, b));
    dangling.extend(orphans.iter().map(|e| e.id));

    for list in snapshot.lists() {
        for entry in snapshot.entries(list.id) {
            if snapshot.todo(entry.todo_id).is_none() {
                dangling.push(entry.id);
            } else if !seen.insert(entry.todo_id) {
                duplicates.push(entry.id);
            } else {
                kept.push(entry);
            }
        }
    }
    (kept, dangling, duplicates)
}

/// Re-roots orphans and cycle members, one unreachable head at a time.
/// Returns the repaired parent of every todo.
fn reroot(snapshot: &Snapshot) -> HashMap<Uuid, Option<Uuid>> {
    let mut todos: Vec<Todo> = snapshot.todos().cloned().collect();

    loop {
        let head = {
            let forest = Forest::build(&todos);
            let Some(first) = forest.unreachable().into_iter().next() else {
                break;
            };
            forest.ancestors(first).last().copied().unwrap_or(first)
        };
        let Some(todo) = todos.iter_mut().find(|t| t.id == head) else {
            break;
        };
        log::warn!("re-rooting unreachable todo {head}");
        todo.parent_id = None;
    }

    todos.into_iter().map(|t| (t.id, t.parent_id)).collect()
}

/// The inspection report plus the changeset that repairs what can be
/// repaired.
pub fn plan_repair(snapshot: &Snapshot, config: &EngineConfig) -> (DoctorReport, Changeset) {
    let report = inspect(snapshot, config);
    let mut changes = Changeset::new();
    if report.is_clean() {
        return (report, changes);
    }

    // Hierarchy: re-root, then renumber every group in canonical order.
    let parents = reroot(snapshot);
    let repaired: Vec<Todo> = snapshot
        .todos()
        .map(|t| {
            let mut t = t.clone();
            if let Some(parent) = parents.get(&t.id) {
                if *parent != t.parent_id && parent.is_none() {
                    // re-rooted nodes go after the existing roots
                    t.position = usize::MAX;
                }
                t.parent_id = *parent;
            }
            t
        })
        .collect();
    let forest = Forest::build(&repaired);
    let mut stack: Vec<Option<Uuid>> = vec![None];
    while let Some(parent) = stack.pop() {
        for (position, id) in forest.children(parent).iter().enumerate() {
            let changed = snapshot
                .todo(*id)
                .is_some_and(|t| t.parent_id != parent || t.position != position);
            if changed {
                changes.positions.todos.push(TodoPosition {
                    id: *id,
                    parent_id: parent,
                    position,
                });
            }
            stack.push(Some(*id));
        }
    }

    // Pinning.
    let (kept, dangling, duplicates) = sort_entries(snapshot);
    changes.removed_entries = dangling.into_iter().chain(duplicates).collect();
    for list in snapshot.lists() {
        let ids: Vec<Uuid> = kept
            .iter()
            .filter(|e| e.list_id == list.id)
            .map(|e| e.id)
            .collect();
        let renumbered = entry_positions(&ids, list.id);
        changes.positions.entries.extend(
            renumbered
                .into_iter()
                .filter(|p| snapshot.entry(p.id).is_some_and(|e| e.position != p.position)),
        );
    }

    let pinned: HashSet<Uuid> = kept.iter().map(|e| e.todo_id).collect();
    for id in &report.pinned_mismatches {
        if let Some(todo) = snapshot.todo(*id) {
            let mut todo = todo.clone();
            todo.pinned = pinned.contains(id);
            changes.todos.push(todo);
        }
    }

    // Lists.
    let lists = snapshot.lists();
    if report.primary_broken() {
        let keep = lists
            .iter()
            .find(|l| l.is_primary)
            .or_else(|| lists.first())
            .map(|l| l.id);
        for list in &lists {
            let primary = Some(list.id) == keep;
            if list.is_primary != primary {
                let mut list = (*list).clone();
                list.is_primary = primary;
                changes.lists.push(list);
            }
        }
    }
    if report.list_order_broken {
        let ids: Vec<Uuid> = lists.iter().map(|l| l.id).collect();
        changes.positions.lists = list_positions(&ids);
    }

    (report, changes)
}

pub fn run<S: TodoStore>(store: &mut S, config: &EngineConfig) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let (report, changes) = plan_repair(&snapshot, config);
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    store.commit(&changes)?;
    log::warn!("doctor repaired stored data: {report:?}");
    result.add_message(CmdMessage::warning("Inconsistencies found:"));
    let mut note = |count: usize, what: &str| {
        if count > 0 {
            result.add_message(CmdMessage::info(format!("  - {count} {what}")));
        }
    };
    note(report.orphaned.len(), "orphaned todo(s) moved to the roots");
    note(report.cycles.len(), "todo(s) in a parent cycle, cycle broken");
    note(report.misnumbered_groups.len(), "sibling group(s) renumbered");
    note(report.pinned_mismatches.len(), "pinned flag(s) corrected");
    note(report.dangling_entries.len(), "dangling pinned entr(ies) removed");
    note(report.duplicate_entries.len(), "duplicate pinned entr(ies) removed");
    note(report.misnumbered_lists.len(), "pinned list(s) renumbered");
    note(usize::from(report.list_order_broken), "list order renumbered");
    note(usize::from(report.primary_broken()), "primary list flag restored");
    if !report.depth_overruns.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "  - {} todo(s) nest deeper than {} and need to be moved by hand",
            report.depth_overruns.len(),
            config.max_depth
        )));
    }

    Ok(result.with_changes(changes))
}
