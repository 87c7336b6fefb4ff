//! Structural queries over the item forest.
//!
//! Every traversal here uses an explicit work stack, so arbitrarily deep trees
//! never exhaust the call stack.

use std::collections::HashSet;

use rusqlite::{Connection, OptionalExtension};

use super::item_from_row;
use crate::error::Result;
use crate::id::ItemId;
use crate::models::{Item, ParentRef};

const ITEM_COLUMNS: &str =
    "id, content, parent_list_id, parent_item_id, created_at, updated_at";

/// Direct children of `parent`, in insertion order.
pub(crate) fn children(conn: &Connection, parent: &ParentRef) -> Result<Vec<Item>> {
    let sql = match parent {
        ParentRef::List(_) => format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE parent_list_id = ? ORDER BY rowid"
        ),
        ParentRef::Item(_) => format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE parent_item_id = ? ORDER BY rowid"
        ),
    };
    let key = match parent {
        ParentRef::List(id) => id.as_str(),
        ParentRef::Item(id) => id.as_str(),
    };

    let mut stmt = conn.prepare_cached(&sql)?;
    let items = stmt
        .query_map([key], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Every item below `root`, each exactly once.
///
/// An item always appears after its parent, so iterating the result in reverse
/// visits children before parents.
pub(crate) fn descendants(conn: &Connection, root: &ParentRef) -> Result<Vec<Item>> {
    let mut found = Vec::new();
    let mut pending = vec![root.clone()];

    while let Some(parent) = pending.pop() {
        for child in children(conn, &parent)? {
            pending.push(ParentRef::Item(child.id.clone()));
            found.push(child);
        }
    }

    Ok(found)
}

/// Removes the given items, children first, so parent foreign keys hold after
/// each statement. `items` must be in [`descendants`] order.
pub(crate) fn delete_items(conn: &Connection, items: &[Item]) -> Result<usize> {
    let mut stmt = conn.prepare_cached("DELETE FROM items WHERE id = ?")?;
    let mut removed = 0;
    for item in items.iter().rev() {
        removed += stmt.execute([item.id.as_str()])?;
    }
    Ok(removed)
}

/// Whether `candidate` is `ancestor` itself or lies somewhere beneath it.
///
/// Walks upward from `candidate` through item parents until it reaches a list.
pub(crate) fn is_within(conn: &Connection, ancestor: &ItemId, candidate: &ItemId) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT parent_item_id FROM items WHERE id = ?")?;
    let mut seen = HashSet::new();
    let mut current = candidate.clone();

    loop {
        if &current == ancestor {
            return Ok(true);
        }
        // A revisit means the stored data already holds a loop; refuse to extend it.
        if !seen.insert(current.clone()) {
            return Ok(true);
        }

        let parent: Option<Option<String>> = stmt
            .query_row([current.as_str()], |row| row.get(0))
            .optional()?;
        match parent.flatten() {
            Some(parent_id) => current = ItemId::from(parent_id),
            None => return Ok(false),
        }
    }
}
