use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ItemId, ListId};

/// A to-do entry, possibly holding nested sub-items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Free text. May be empty.
    pub content: String,
    pub parent: ParentRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where an item hangs in the tree: directly under a list, or under another item.
///
/// Serialized as `{"kind": "list", "id": "..."}` or `{"kind": "item", "id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    List(ListId),
    Item(ItemId),
}

impl ParentRef {
    pub fn kind(&self) -> ParentKind {
        match self {
            Self::List(_) => ParentKind::List,
            Self::Item(_) => ParentKind::Item,
        }
    }

    pub fn list_id(&self) -> Option<&ListId> {
        match self {
            Self::List(id) => Some(id),
            Self::Item(_) => None,
        }
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            Self::List(_) => None,
            Self::Item(id) => Some(id),
        }
    }
}

/// The two kinds of node an item can be parented under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    List,
    Item,
}

impl ParentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Item => "item",
        }
    }

    /// Parses the wire name. Matching is exact: `"List"` or `" list"` are rejected.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "list" => Some(Self::List),
            "item" => Some(Self::Item),
            _ => None,
        }
    }

    /// Pairs the kind with a raw identifier.
    pub fn with_id(self, id: impl Into<String>) -> ParentRef {
        match self {
            Self::List => ParentRef::List(ListId::from(id.into())),
            Self::Item => ParentRef::Item(ItemId::from(id.into())),
        }
    }
}
