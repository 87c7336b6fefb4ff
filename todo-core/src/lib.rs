//! Core of the hierarchical to-do server.
//!
//! Lists own trees of items. This crate holds the data model, the SQLite-backed
//! [`TreeStore`] that enforces tree integrity, the read-only [`hierarchy`]
//! projection and the [`service::MutationService`] that validates requests
//! before they reach the store.

pub mod db;
pub mod error;
pub mod hierarchy;
pub mod id;
pub mod models;
pub mod service;
pub mod store;

pub use error::{Result, TodoError};
pub use id::{ItemId, ListId};
pub use store::TreeStore;
