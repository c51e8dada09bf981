//! # Storage Layer
//!
//! This module defines the storage abstraction for todonest. The [`TodoStore`]
//! trait lets the engine run against any persistence layer that can hand out
//! a consistent [`Snapshot`] and apply a [`Changeset`] atomically.
//!
//! ## Load, Plan, Commit
//!
//! Every mutating command follows the same three steps:
//! 1. **Load**: read a [`Snapshot`] of all todos, pinned lists and entries.
//! 2. **Plan**: compute a [`Changeset`] from the snapshot. Planning is pure
//!    and all precondition checks happen here.
//! 3. **Commit**: hand the changeset to [`TodoStore::commit`].
//!
//! A failed precondition aborts before step 3, so nothing is written.
//!
//! ## Atomicity
//!
//! A changeset is applied fully or not at all. Readers never observe a
//! half-renumbered sibling group. [`Snapshot::apply`] stages the change on a
//! copy, runs referential checks on the touched records and only then swaps
//! the copy in.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: holds one snapshot in memory. Used by tests
//!   and by embedders that persist elsewhere.

use crate::error::Result;

pub mod changeset;
pub mod memory;
pub mod snapshot;

pub use changeset::{Changeset, EntryPosition, ListPosition, TodoPosition, UpdatedPositions};
pub use snapshot::Snapshot;

/// Abstract interface for todo storage.
pub trait TodoStore {
    /// A consistent view of every record.
    fn load(&self) -> Result<Snapshot>;

    /// Applies `changes` as a single transaction.
    fn commit(&mut self, changes: &Changeset) -> Result<()>;
}
