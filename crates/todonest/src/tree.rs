//! # Tree Model
//!
//! Todos are stored flat: each record carries a `parent_id` and a `position`.
//! [`Forest`] is an arena over such a record set. It indexes todos by id and
//! groups child ids per parent, sorted by `position` (ties fall back to
//! `created_at`, then id, so the order is total even on dirty input).
//!
//! ## Queries
//!
//! - [`Forest::depth`]: distance from the root (root = 0)
//! - [`Forest::subtree_height`]: longest downward path to a leaf (leaf = 0)
//! - [`Forest::is_descendant`]: whether a node sits anywhere below another
//!
//! ## Malformed Input
//!
//! The forest never assumes the records are acyclic or that every
//! `parent_id` resolves. Every walk keeps a visited set over the known ids,
//! so a cycle ends the walk instead of looping. A `parent_id` pointing at an
//! unknown id ends an upward walk at that node. Nodes that cannot be reached
//! from a root (orphans, cycle members) are reported by
//! [`Forest::unreachable`] and left out of the nested view.
//!
//! ## Nested View
//!
//! [`Forest::to_nodes`] builds owned [`TodoNode`] trees. The build recurses
//! once per level. Valid data is bounded by the configured maximum depth, and
//! the visited set keeps corrupted data from recursing forever.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::fuzzy::MatchResult;
use crate::model::Todo;
use crate::store::TodoPosition;

/// A todo with its children in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoNode {
    pub todo: Todo,
    pub children: Vec<TodoNode>,
    /// Set by search when this node's title matched the query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<MatchResult>,
}

impl TodoNode {
    /// Finds a node by id in this subtree (self included).
    pub fn find(&self, id: Uuid) -> Option<&TodoNode> {
        if self.todo.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree (self included).
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TodoNode::count).sum::<usize>()
    }
}

/// Finds a node by id anywhere in a list of trees.
pub fn find_node(nodes: &[TodoNode], id: Uuid) -> Option<&TodoNode> {
    nodes.iter().find_map(|node| node.find(id))
}

/// Flattens nested trees back into `{id, parent_id, position}` triples,
/// taking parent and position from the structure itself.
pub fn flatten(nodes: &[TodoNode]) -> Vec<TodoPosition> {
    let mut out = Vec::new();
    flatten_level(nodes, None, &mut out);
    out
}

fn flatten_level(nodes: &[TodoNode], parent_id: Option<Uuid>, out: &mut Vec<TodoPosition>) {
    for (position, node) in nodes.iter().enumerate() {
        out.push(TodoPosition {
            id: node.todo.id,
            parent_id,
            position,
        });
        flatten_level(&node.children, Some(node.todo.id), out);
    }
}

/// Canonical sibling order.
pub(crate) fn sibling_order(a: &Todo, b: &Todo) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Arena over a flat todo record set.
pub struct Forest<'a> {
    todos: HashMap<Uuid, &'a Todo>,
    children: HashMap<Option<Uuid>, Vec<Uuid>>,
}

impl<'a> Forest<'a> {
    /// Indexes `todos`. Input order does not matter.
    pub fn build<I>(todos: I) -> Self
    where
        I: IntoIterator<Item = &'a Todo>,
    {
        let todos: HashMap<Uuid, &'a Todo> = todos.into_iter().map(|t| (t.id, t)).collect();

        let mut children: HashMap<Option<Uuid>, Vec<Uuid>> = HashMap::new();
        for todo in todos.values() {
            children.entry(todo.parent_id).or_default().push(todo.id);
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| sibling_order(todos[a], todos[b]));
        }

        Self { todos, children }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.todos.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&'a Todo> {
        self.todos.get(&id).copied()
    }

    /// Child ids of `parent` in position order. `None` addresses the roots.
    pub fn children(&self, parent: Option<Uuid>) -> &[Uuid] {
        self.children
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[Uuid] {
        self.children(None)
    }

    /// Distance from the root. Roots, `None` and unknown ids are at depth 0.
    pub fn depth(&self, id: Option<Uuid>) -> usize {
        let Some(mut current) = id else {
            return 0;
        };

        let mut depth = 0;
        let mut seen = HashSet::new();
        while let Some(parent) = self.get(current).and_then(|t| t.parent_id) {
            if !seen.insert(current) || !self.contains(parent) {
                break;
            }
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Longest downward path from `id` to a leaf. A leaf has height 0.
    pub fn subtree_height(&self, id: Uuid) -> usize {
        let mut height = 0;
        let mut seen = HashSet::from([id]);
        let mut frontier = vec![id];

        loop {
            let next: Vec<Uuid> = frontier
                .iter()
                .flat_map(|parent| self.children(Some(*parent)))
                .copied()
                .filter(|child| seen.insert(*child))
                .collect();
            if next.is_empty() {
                return height;
            }
            height += 1;
            frontier = next;
        }
    }

    /// True iff `node` appears anywhere beneath `ancestor`. A node is never
    /// its own descendant.
    pub fn is_descendant(&self, ancestor: Uuid, node: Uuid) -> bool {
        if ancestor == node {
            return false;
        }

        let mut seen = HashSet::new();
        let mut current = node;
        while let Some(parent) = self.get(current).and_then(|t| t.parent_id) {
            if parent == ancestor {
                return true;
            }
            if !seen.insert(parent) {
                return false;
            }
            current = parent;
        }
        false
    }

    /// Ancestor ids of `id`, nearest first.
    pub fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|t| t.parent_id) {
            if !self.contains(parent) || !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }

    /// `id` followed by all of its descendants, depth first in display order.
    pub fn subtree(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(Some(current)).iter().rev());
        }
        out
    }

    /// Ids that cannot be reached by walking down from the roots.
    pub fn unreachable(&self) -> Vec<Uuid> {
        let mut reachable = HashSet::new();
        for root in self.roots() {
            reachable.extend(self.subtree(*root));
        }
        let mut out: Vec<Uuid> = self
            .todos
            .values()
            .filter(|t| !reachable.contains(&t.id))
            .map(|t| t.id)
            .collect();
        out.sort_by(|a, b| sibling_order(self.todos[a], self.todos[b]));
        out
    }

    /// Builds the nested view rooted at the forest's roots.
    pub fn to_nodes(&self) -> Vec<TodoNode> {
        let mut seen = HashSet::new();
        let nodes = self.build_level(None, &mut seen);
        if seen.len() < self.todos.len() {
            log::warn!(
                "{} todo(s) unreachable from any root were left out of the tree",
                self.todos.len() - seen.len()
            );
        }
        nodes
    }

    /// Builds the nested view of a single subtree.
    pub fn node(&self, id: Uuid) -> Option<TodoNode> {
        let todo = self.get(id)?;
        let mut seen = HashSet::from([id]);
        Some(TodoNode {
            todo: todo.clone(),
            children: self.build_level(Some(id), &mut seen),
            matches: None,
        })
    }

    fn build_level(&self, parent: Option<Uuid>, seen: &mut HashSet<Uuid>) -> Vec<TodoNode> {
        let mut level = Vec::new();
        for id in self.children(parent) {
            if !seen.insert(*id) {
                continue;
            }
            let children = self.build_level(Some(*id), seen);
            level.push(TodoNode {
                todo: self.todos[id].clone(),
                children,
                matches: None,
            });
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str, parent: Option<&Todo>, position: usize) -> Todo {
        Todo::new(title.to_string(), parent.map(|p| p.id), position)
    }

    /// root
    /// ├── a
    /// │   └── a1
    /// │       └── a1x
    /// └── b
    fn sample() -> Vec<Todo> {
        let root = todo("root", None, 0);
        let a = todo("a", Some(&root), 0);
        let b = todo("b", Some(&root), 1);
        let a1 = todo("a1", Some(&a), 0);
        let a1x = todo("a1x", Some(&a1), 0);
        // deliberately unsorted
        vec![a1x, b, root, a1, a]
    }

    fn id_of(todos: &[Todo], title: &str) -> Uuid {
        todos.iter().find(|t| t.title == title).unwrap().id
    }

    #[test]
    fn test_children_sorted_by_position_regardless_of_input_order() {
        let mut todos = sample();
        let root = id_of(&todos, "root");
        // swap positions of a and b
        for t in todos.iter_mut() {
            match t.title.as_str() {
                "a" => t.position = 1,
                "b" => t.position = 0,
                _ => {}
            }
        }
        let forest = Forest::build(&todos);
        let titles: Vec<&str> = forest
            .children(Some(root))
            .iter()
            .map(|id| forest.get(*id).unwrap().title.as_str())
            .collect();
        assert_eq!(titles, vec!["b", "a"]);
        assert_eq!(forest.roots(), &[root]);
    }

    #[test]
    fn test_depth_counts_edges_to_root() {
        let todos = sample();
        let forest = Forest::build(&todos);
        assert_eq!(forest.depth(None), 0);
        assert_eq!(forest.depth(Some(id_of(&todos, "root"))), 0);
        assert_eq!(forest.depth(Some(id_of(&todos, "a"))), 1);
        assert_eq!(forest.depth(Some(id_of(&todos, "a1"))), 2);
        assert_eq!(forest.depth(Some(id_of(&todos, "a1x"))), 3);
        assert_eq!(forest.depth(Some(Uuid::new_v4())), 0);
    }

    #[test]
    fn test_subtree_height_is_longest_downward_path() {
        let todos = sample();
        let forest = Forest::build(&todos);
        assert_eq!(forest.subtree_height(id_of(&todos, "root")), 3);
        assert_eq!(forest.subtree_height(id_of(&todos, "a")), 2);
        assert_eq!(forest.subtree_height(id_of(&todos, "b")), 0);
        assert_eq!(forest.subtree_height(id_of(&todos, "a1x")), 0);
    }

    #[test]
    fn test_is_descendant_walks_the_whole_chain() {
        let todos = sample();
        let forest = Forest::build(&todos);
        let root = id_of(&todos, "root");
        let a = id_of(&todos, "a");
        let b = id_of(&todos, "b");
        let a1x = id_of(&todos, "a1x");

        assert!(forest.is_descendant(root, a1x));
        assert!(forest.is_descendant(a, a1x));
        assert!(!forest.is_descendant(b, a1x));
        assert!(!forest.is_descendant(a1x, root));
        for t in &todos {
            assert!(!forest.is_descendant(t.id, t.id));
        }
    }

    #[test]
    fn test_subtree_and_ancestors() {
        let todos = sample();
        let forest = Forest::build(&todos);
        let a = id_of(&todos, "a");
        let a1 = id_of(&todos, "a1");
        let a1x = id_of(&todos, "a1x");
        let root = id_of(&todos, "root");

        assert_eq!(forest.subtree(a), vec![a, a1, a1x]);
        assert_eq!(forest.ancestors(a1x), vec![a1, a, root]);
        assert!(forest.ancestors(root).is_empty());
    }

    #[test]
    fn test_cycles_do_not_hang() {
        let mut x = Todo::new("x".into(), None, 0);
        let mut y = Todo::new("y".into(), None, 0);
        x.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        let mut selfie = Todo::new("self".into(), None, 0);
        selfie.parent_id = Some(selfie.id);
        let todos = vec![x.clone(), y.clone(), selfie.clone()];
        let forest = Forest::build(&todos);

        assert!(forest.depth(Some(x.id)) <= 2);
        assert!(forest.subtree_height(x.id) <= 2);
        assert!(forest.is_descendant(x.id, y.id));
        assert!(!forest.is_descendant(selfie.id, selfie.id));
        assert_eq!(forest.subtree(x.id).len(), 2);
        assert_eq!(forest.unreachable().len(), 3);
        assert!(forest.to_nodes().is_empty());
    }

    #[test]
    fn test_orphan_stops_upward_walk() {
        let orphan = Todo::new("orphan".into(), Some(Uuid::new_v4()), 0);
        let child = Todo::new("child".into(), Some(orphan.id), 1);
        let todos = vec![orphan.clone(), child.clone()];
        let forest = Forest::build(&todos);

        assert_eq!(forest.depth(Some(orphan.id)), 0);
        assert_eq!(forest.depth(Some(child.id)), 1);
        assert_eq!(forest.ancestors(child.id), vec![orphan.id]);
        assert_eq!(forest.unreachable(), vec![orphan.id, child.id]);
    }

    #[test]
    fn test_nested_view_round_trips_through_flatten() {
        let todos = sample();
        let forest = Forest::build(&todos);
        let nodes = forest.to_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].count(), 5);

        let mut flat = flatten(&nodes);
        let mut expected: Vec<TodoPosition> = todos
            .iter()
            .map(|t| TodoPosition {
                id: t.id,
                parent_id: t.parent_id,
                position: t.position,
            })
            .collect();
        flat.sort_by_key(|p| p.id);
        expected.sort_by_key(|p| p.id);
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_node_builds_single_subtree() {
        let todos = sample();
        let forest = Forest::build(&todos);
        let a = id_of(&todos, "a");
        let node = forest.node(a).unwrap();
        assert_eq!(node.count(), 3);
        assert!(node.find(id_of(&todos, "a1x")).is_some());
        assert!(node.find(id_of(&todos, "b")).is_none());
        assert!(forest.node(Uuid::new_v4()).is_none());
    }
}
