//! # Todonest Architecture
//!
//! Todonest is a **UI-agnostic engine for nested todo lists**: depth-limited
//! hierarchies with drag-and-drop style reordering, pinned lists, and fuzzy
//! search-as-you-type. Transports (HTTP, desktop, CLI) and real persistence
//! live outside; they hand the engine a store and call the API.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns store and config         │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Load snapshot, check preconditions, plan, commit         │
//! │  - Reorder engines for todos, pinned entries and lists      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (tree.rs, fuzzy.rs, model.rs)                         │
//! │  - Forest arena: depth, subtree height, descendant checks   │
//! │  - Levenshtein based multi-token matcher                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Snapshot + Changeset, applied all or nothing             │
//! │  - TodoStore trait, InMemoryStore                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! Every committed state satisfies:
//! - each `parent_id` resolves, and no todo is its own ancestor
//! - sibling positions are exactly `0..n-1`
//! - `depth + subtree height <= max_depth` for every todo
//! - `pinned` is true iff the todo has a pinned entry, and it has at most one
//! - exactly one pinned list is primary once any list exists
//!
//! Commands check all preconditions before computing anything, and a
//! rejected command writes nothing. Data that breaks these rules on load is
//! tolerated by the tree model and repaired by `doctor`.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests of the business logic
//!    against [`store::memory::InMemoryStore`] fixtures.
//! 2. **Core** (`tree.rs`, `fuzzy.rs`): algorithm tests, including
//!    malformed input.
//! 3. **Integration** (`tests/`): scenarios and invariants through the API.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod model;
pub mod store;
pub mod tags;
pub mod tree;

pub use api::TodoApi;
pub use config::EngineConfig;
pub use error::{Result, TodoError};
