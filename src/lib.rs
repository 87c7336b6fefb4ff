//! HTTP API and command-line front end for hierarchical to-do lists.
//!
//! The tree model, store and mutation service live in [`todo_core`] and are
//! re-exported here so callers only need one crate.

pub mod api;
pub mod render;

pub use todo_core::{db, hierarchy, models, service, ItemId, ListId, TodoError, TreeStore};
