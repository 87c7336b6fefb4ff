//! Domain models for the to-do tree.
//!
//! # Core Concepts
//!
//! - [`List`]: Named top-level container. Owns the items whose parent is the list.
//! - [`Item`]: A to-do entry. Its parent is exactly one of a list or another item,
//!   expressed as [`ParentRef`], so items nest into a tree per list.
//! - [`ListTree`] / [`ItemNode`]: Nested, read-only projection of one list used for
//!   presentation.

mod item;
mod list;
mod tree;

pub use item::*;
pub use list::*;
pub use tree::*;
