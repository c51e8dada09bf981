//! Read-only views: the nested tree and search.
//!
//! Search combines three filters, all of which a todo must pass to count as
//! a hit: every requested tag present, an optional completion state, and a
//! fuzzy match of the query against the title. [`search`] keeps the tree
//! shape, pruning every branch without a hit. [`search_ranked`] returns the
//! hits alone, best first.

use crate::commands::CmdResult;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::fuzzy::{match_query, MatchResult};
use crate::model::Todo;
use crate::store::{Snapshot, TodoStore};
use crate::tags::normalize_tags;
use crate::tree::TodoNode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    /// Fuzzy title query. Blank means no query.
    pub query: Option<String>,
    /// Todos must carry all of these tags.
    pub tags: Vec<String>,
    /// Only todos with this completion state.
    pub completed: Option<bool>,
}

impl TodoFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// A filter with tags normalized and a blank query dropped.
struct Criteria<'a> {
    query: Option<&'a str>,
    tags: Vec<String>,
    completed: Option<bool>,
    config: &'a EngineConfig,
}

impl<'a> Criteria<'a> {
    fn new(filter: &'a TodoFilter, config: &'a EngineConfig) -> Result<Self> {
        Ok(Self {
            query: filter.query.as_deref().filter(|q| !q.trim().is_empty()),
            tags: normalize_tags(&filter.tags)?,
            completed: filter.completed,
            config,
        })
    }

    fn is_active(&self) -> bool {
        self.query.is_some() || !self.tags.is_empty() || self.completed.is_some()
    }

    /// `None` when `todo` is not a hit. A hit without a query carries no
    /// match data.
    fn check(&self, todo: &Todo) -> Option<Option<MatchResult>> {
        if !self.tags.iter().all(|tag| todo.tags.contains(tag)) {
            return None;
        }
        if self.completed.is_some_and(|c| c != todo.completed) {
            return None;
        }
        match self.query {
            Some(query) => match_query(query, &todo.title, &self.config.fuzzy).map(Some),
            None => Some(None),
        }
    }
}

/// The whole forest in display order.
pub fn tree<S: TodoStore>(store: &S) -> Result<CmdResult> {
    let snapshot = store.load()?;
    Ok(CmdResult::default().with_listed_todos(snapshot.forest().to_nodes()))
}

/// Hits in tree shape. An ancestor without a hit of its own stays in as
/// long as some descendant is a hit.
pub fn filter_tree(
    snapshot: &Snapshot,
    config: &EngineConfig,
    filter: &TodoFilter,
) -> Result<Vec<TodoNode>> {
    let criteria = Criteria::new(filter, config)?;
    let nodes = snapshot.forest().to_nodes();
    if !criteria.is_active() {
        return Ok(nodes);
    }
    Ok(nodes
        .into_iter()
        .filter_map(|node| prune(node, &criteria))
        .collect())
}

fn prune(mut node: TodoNode, criteria: &Criteria<'_>) -> Option<TodoNode> {
    node.children = node
        .children
        .into_iter()
        .filter_map(|child| prune(child, criteria))
        .collect();

    match criteria.check(&node.todo) {
        Some(matches) => {
            node.matches = matches;
            Some(node)
        }
        None if !node.children.is_empty() => Some(node),
        None => None,
    }
}

/// Hits only, without children: best score first, then shorter title, then
/// tree order.
pub fn rank(
    snapshot: &Snapshot,
    config: &EngineConfig,
    filter: &TodoFilter,
) -> Result<Vec<TodoNode>> {
    let criteria = Criteria::new(filter, config)?;
    let forest = snapshot.forest();

    let mut hits = Vec::new();
    for root in forest.roots() {
        for id in forest.subtree(*root) {
            let Some(todo) = forest.get(id) else {
                continue;
            };
            if let Some(matches) = criteria.check(todo) {
                hits.push(TodoNode {
                    todo: todo.clone(),
                    children: Vec::new(),
                    matches,
                });
            }
        }
    }

    hits.sort_by(|a, b| {
        let score = |n: &TodoNode| n.matches.as_ref().map_or(0.0, |m| m.score);
        score(b)
            .total_cmp(&score(a))
            .then_with(|| title_len(&a.todo).cmp(&title_len(&b.todo)))
    });
    Ok(hits)
}

fn title_len(todo: &Todo) -> usize {
    todo.title.chars().count()
}

pub fn search<S: TodoStore>(
    store: &S,
    config: &EngineConfig,
    filter: &TodoFilter,
) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let nodes = filter_tree(&snapshot, config, filter)?;
    Ok(CmdResult::default().with_listed_todos(nodes))
}

pub fn search_ranked<S: TodoStore>(
    store: &S,
    config: &EngineConfig,
    filter: &TodoFilter,
) -> Result<CmdResult> {
    let snapshot = store.load()?;
    let nodes = rank(&snapshot, config, filter)?;
    Ok(CmdResult::default().with_listed_todos(nodes))
}
