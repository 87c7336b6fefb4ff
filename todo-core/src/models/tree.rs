use serde::{Deserialize, Serialize, Serializer};

use super::{Item, List};
use crate::id::{ItemId, ListId};

/// A list with its items nested under it, used for tree responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListTree {
    pub id: ListId,
    pub title: String,
    pub items: Vec<ItemNode>,
}

/// An item with its nested sub-items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemNode {
    pub id: ItemId,
    pub content: String,
    #[serde(rename = "subItems")]
    pub sub_items: Vec<ItemNode>,
}

impl From<List> for ListTree {
    /// A list with no items attached, as returned right after creation.
    fn from(list: List) -> Self {
        Self {
            id: list.id,
            title: list.title,
            items: Vec::new(),
        }
    }
}

impl From<Item> for ItemNode {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            content: item.content,
            sub_items: Vec::new(),
        }
    }
}

/// Every list hierarchy keyed by list id.
///
/// Serializes as a JSON object whose keys appear in list creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListIndex(pub Vec<ListTree>);

impl Serialize for ListIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|tree| (&tree.id, tree)))
    }
}

impl From<Vec<ListTree>> for ListIndex {
    fn from(trees: Vec<ListTree>) -> Self {
        Self(trees)
    }
}

/// A list together with every item in its subtree, read at one point in time.
///
/// Items are in no particular order across parents, but siblings keep the
/// order the store returned them in.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub list: List,
    pub items: Vec<Item>,
}
