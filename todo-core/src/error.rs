use thiserror::Error;

use crate::id::{ItemId, ListId};

pub type Result<T, E = TodoError> = std::result::Result<T, E>;

/// Everything that can go wrong in the tree store or mutation service.
///
/// The first group are caller errors and are never worth retrying unchanged.
/// The second group are store-level failures: the operation was rolled back as a
/// whole and may be retried.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("List not found: {0}")]
    ListNotFound(ListId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Parent kind was missing or something other than `list` / `item`.
    #[error("Invalid parent type: {0:?}")]
    InvalidParent(Option<String>),

    #[error("Missing required field: {0}")]
    InvalidRequest(&'static str),

    /// The move target is the item itself or lies inside its subtree.
    #[error("Cannot move item {item} under {target}: target is inside the item's own subtree")]
    Cycle { item: ItemId, target: ItemId },

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Database lock poisoned")]
    Poisoned,
}

impl TodoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ListNotFound(_) | Self::ItemNotFound(_))
    }

    /// Caller mistakes that correspond to a "bad request".
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            Self::InvalidParent(_) | Self::InvalidRequest(_) | Self::Cycle { .. }
        )
    }
}
