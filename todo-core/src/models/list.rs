use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ListId;

/// Title given to a list created without one.
pub const DEFAULT_LIST_TITLE: &str = "Untitled List";

/// A named to-do list.
///
/// Lists are the roots of the item forest. Deleting a list deletes every item
/// beneath it, however deeply nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
