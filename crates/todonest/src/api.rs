//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all todonest operations, whatever transport sits in front.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** the store and the engine configuration
//! - **Dispatches** to the appropriate command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **I/O operations**: No stdout, stderr, or formatting
//!
//! ## Generic Over TodoStore
//!
//! `TodoApi<S: TodoStore>` is generic over the storage backend. Tests and
//! embedders use [`crate::store::memory::InMemoryStore`]; a database-backed
//! store only has to implement `load` and `commit`.
//!
//! ## Serializing Writers
//!
//! Every mutating method takes `&mut self`, so one facade never runs two
//! mutations at once. Callers sharing a facade across threads wrap it in a
//! lock; the store's `commit` is the transaction boundary.

use uuid::Uuid;

use crate::commands::{self, get::TodoFilter, CmdResult};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::fuzzy::{match_query, MatchResult};
use crate::store::TodoStore;

/// The main API facade for todonest operations.
pub struct TodoApi<S: TodoStore> {
    store: S,
    config: EngineConfig,
}

impl<S: TodoStore> TodoApi<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn create_todo(
        &mut self,
        title: &str,
        parent_id: Option<Uuid>,
        tags: &[String],
    ) -> Result<CmdResult> {
        self.logged("create_todo", |store, config| {
            commands::create::run(store, config, title, parent_id, tags)
        })
    }

    pub fn rename_todo(&mut self, id: Uuid, title: &str) -> Result<CmdResult> {
        self.logged("rename_todo", |store, _| {
            commands::update::rename(store, id, title)
        })
    }

    pub fn set_completed(&mut self, id: Uuid, completed: bool) -> Result<CmdResult> {
        self.logged("set_completed", |store, _| {
            commands::update::set_completed(store, id, completed)
        })
    }

    pub fn toggle_completed(&mut self, id: Uuid) -> Result<CmdResult> {
        self.logged("toggle_completed", |store, _| {
            commands::update::toggle_completed(store, id)
        })
    }

    pub fn set_tags(&mut self, id: Uuid, tags: &[String]) -> Result<CmdResult> {
        self.logged("set_tags", |store, _| {
            commands::update::set_tags(store, id, tags)
        })
    }

    pub fn delete_todo(&mut self, id: Uuid) -> Result<CmdResult> {
        self.logged("delete_todo", |store, _| commands::delete::run(store, id))
    }

    /// Moves `id` with its subtree under `target_parent` (`None` = roots) at
    /// `target_index`, clamped to the target group.
    pub fn move_todo(
        &mut self,
        id: Uuid,
        target_parent: Option<Uuid>,
        target_index: isize,
    ) -> Result<CmdResult> {
        self.logged("move_todo", |store, config| {
            commands::move_todos::run(store, config, id, target_parent, target_index)
        })
    }

    pub fn toggle_pinned(&mut self, id: Uuid, pinned: bool) -> Result<CmdResult> {
        self.logged("toggle_pinned", |store, config| {
            commands::pinning::toggle(store, config, id, pinned)
        })
    }

    pub fn move_pinned_todo(
        &mut self,
        todo_id: Uuid,
        list_id: Uuid,
        target_index: isize,
    ) -> Result<CmdResult> {
        self.logged("move_pinned_todo", |store, _| {
            commands::pinning::move_entry(store, todo_id, list_id, target_index)
        })
    }

    pub fn pinned_lists(&mut self) -> Result<CmdResult> {
        self.logged("pinned_lists", commands::lists::list)
    }

    pub fn add_pinned_list(&mut self, title: &str) -> Result<CmdResult> {
        self.logged("add_pinned_list", |store, config| {
            commands::lists::add(store, config, title)
        })
    }

    pub fn rename_pinned_list(&mut self, id: Uuid, title: &str) -> Result<CmdResult> {
        self.logged("rename_pinned_list", |store, _| {
            commands::lists::rename(store, id, title)
        })
    }

    pub fn move_pinned_list(&mut self, id: Uuid, target_index: isize) -> Result<CmdResult> {
        self.logged("move_pinned_list", |store, _| {
            commands::lists::move_list(store, id, target_index)
        })
    }

    pub fn delete_pinned_list(&mut self, id: Uuid) -> Result<CmdResult> {
        self.logged("delete_pinned_list", |store, config| {
            commands::lists::delete(store, config, id)
        })
    }

    pub fn tree(&self) -> Result<CmdResult> {
        commands::get::tree(&self.store)
    }

    pub fn search(&self, filter: &TodoFilter) -> Result<CmdResult> {
        commands::get::search(&self.store, &self.config, filter)
    }

    pub fn search_ranked(&self, filter: &TodoFilter) -> Result<CmdResult> {
        commands::get::search_ranked(&self.store, &self.config, filter)
    }

    /// Fuzzy match of `query` against arbitrary `text` with the configured
    /// thresholds.
    pub fn match_text(&self, query: &str, text: &str) -> Option<MatchResult> {
        match_query(query, text, &self.config.fuzzy)
    }

    pub fn doctor(&mut self) -> Result<CmdResult> {
        self.logged("doctor", commands::doctor::run)
    }

    fn logged<F>(&mut self, op: &str, f: F) -> Result<CmdResult>
    where
        F: FnOnce(&mut S, &EngineConfig) -> Result<CmdResult>,
    {
        match f(&mut self.store, &self.config) {
            Ok(result) => {
                if !result.changes.is_empty() {
                    log::info!(
                        "{op}: committed {} todo(s), {} removal(s), {} position(s)",
                        result.changes.todos.len(),
                        result.changes.removed_todos.len()
                            + result.changes.removed_entries.len()
                            + result.changes.removed_lists.len(),
                        result.changes.positions.todos.len()
                            + result.changes.positions.entries.len()
                            + result.changes.positions.lists.len()
                    );
                }
                Ok(result)
            }
            Err(err) => {
                log::debug!("{op} rejected: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;
    use crate::store::memory::InMemoryStore;

    fn api() -> TodoApi<InMemoryStore> {
        TodoApi::new(InMemoryStore::new(), EngineConfig::default())
    }

    #[test]
    fn test_create_then_tree() {
        let mut api = api();
        let root = api.create_todo("Root", None, &[]).unwrap().affected_todos[0].id;
        api.create_todo("Child", Some(root), &[]).unwrap();

        let tree = api.tree().unwrap();
        assert_eq!(tree.listed_todos.len(), 1);
        assert_eq!(tree.listed_todos[0].children[0].todo.title, "Child");
    }

    #[test]
    fn test_errors_pass_through() {
        let mut api = api();
        let err = api.move_todo(Uuid::new_v4(), None, 0).unwrap_err();
        assert!(matches!(err, TodoError::NotFound(_)));
        assert_eq!(api.store().revision(), 0);
    }

    #[test]
    fn test_match_text_uses_config() {
        let api = api();
        assert!(api.match_text("tes", "Test").is_some());
        assert!(api.match_text("", "Test").is_none());
    }

    #[test]
    fn test_pinned_lists_dispatch() {
        let mut api = api();
        let lists = api.pinned_lists().unwrap();
        assert_eq!(lists.listed_lists.len(), 1);
        let primary = lists.listed_lists[0].list.id;
        let err = api.delete_pinned_list(primary).unwrap_err();
        assert!(matches!(err, TodoError::InvalidOperation(_)));
    }
}
