//! The persistence contract the rest of the core is written against.

use crate::error::Result;
use crate::id::{ItemId, ListId};
use crate::models::{Item, List, ListSnapshot, ParentRef};

/// Authoritative storage of lists and items.
///
/// Implementations must make every method atomic: a failed call leaves no
/// partial change behind. Structural operations (create, delete, move) must be
/// serialized against each other so that concurrent callers can never produce a
/// cycle or a dangling parent reference.
pub trait TreeStore {
    /// Creates a list. A missing title becomes [`DEFAULT_LIST_TITLE`](crate::models::DEFAULT_LIST_TITLE).
    fn create_list(&self, title: Option<String>) -> Result<List>;

    fn get_list(&self, id: &ListId) -> Result<List>;

    /// All lists, in insertion order.
    fn list_all(&self) -> Result<Vec<List>>;

    fn update_list_title(&self, id: &ListId, title: String) -> Result<List>;

    /// Deletes the list and every item beneath it.
    fn delete_list(&self, id: &ListId) -> Result<()>;

    /// Fails with a not-found error when `parent` does not exist.
    fn create_item(&self, parent: &ParentRef, content: String) -> Result<Item>;

    fn get_item(&self, id: &ItemId) -> Result<Item>;

    fn update_item_content(&self, id: &ItemId, content: String) -> Result<Item>;

    /// Deletes the item and all of its descendants. The parent and siblings are untouched.
    fn delete_item(&self, id: &ItemId) -> Result<()>;

    /// Re-parents an item, rejecting targets inside the item's own subtree.
    fn move_item(&self, id: &ItemId, target: &ParentRef) -> Result<Item>;

    /// One list and all items of its subtree, read consistently.
    fn snapshot_list(&self, id: &ListId) -> Result<ListSnapshot>;

    /// Every list with its items, read consistently.
    fn snapshot_all(&self) -> Result<Vec<ListSnapshot>>;
}
