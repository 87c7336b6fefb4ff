//! Read-only nested projection of a list and its items.

use std::collections::HashMap;

use crate::error::Result;
use crate::id::{ItemId, ListId};
use crate::models::{Item, ItemNode, ListSnapshot, ListTree, ParentRef};
use crate::store::TreeStore;

/// Assembles a snapshot into a nested tree.
///
/// Top-level items are those parented directly by the list. Each item then
/// receives its direct children, depth first. Siblings keep snapshot order.
/// Items whose parent is not reachable from the list are left out.
///
/// Nodes are assembled bottom-up from an explicit work list, so the depth of
/// the tree does not grow the call stack here.
pub fn build_hierarchy(snapshot: ListSnapshot) -> ListTree {
    let ListSnapshot { list, items } = snapshot;

    let mut top_level: Vec<ItemId> = Vec::new();
    let mut children_of: HashMap<ItemId, Vec<ItemId>> = HashMap::new();
    let mut by_id: HashMap<ItemId, Item> = HashMap::new();
    for item in items {
        match &item.parent {
            ParentRef::List(list_id) if *list_id == list.id => top_level.push(item.id.clone()),
            ParentRef::List(_) => continue,
            ParentRef::Item(parent_id) => children_of
                .entry(parent_id.clone())
                .or_default()
                .push(item.id.clone()),
        }
        by_id.insert(item.id.clone(), item);
    }

    // Parents precede their children in `order`.
    let mut order = Vec::with_capacity(by_id.len());
    let mut pending: Vec<&ItemId> = top_level.iter().collect();
    while let Some(id) = pending.pop() {
        order.push(id.clone());
        if let Some(children) = children_of.get(id) {
            pending.extend(children);
        }
    }

    let mut built: HashMap<ItemId, ItemNode> = HashMap::new();
    for id in order.into_iter().rev() {
        let Some(item) = by_id.remove(&id) else {
            continue;
        };
        let mut node = ItemNode::from(item);
        if let Some(children) = children_of.get(&id) {
            node.sub_items = children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
        }
        built.insert(id, node);
    }

    ListTree {
        id: list.id,
        title: list.title,
        items: top_level
            .iter()
            .filter_map(|id| built.remove(id))
            .collect(),
    }
}

/// The nested tree of a single list.
pub fn list_tree<S: TreeStore>(store: &S, id: &ListId) -> Result<ListTree> {
    store.snapshot_list(id).map(build_hierarchy)
}

/// Nested trees of every list, in list insertion order.
pub fn all_trees<S: TreeStore>(store: &S) -> Result<Vec<ListTree>> {
    Ok(store
        .snapshot_all()?
        .into_iter()
        .map(build_hierarchy)
        .collect())
}
