//! Validation and dispatch of mutations onto a [`TreeStore`].
//!
//! Callers hand in a [`MutationRequest`], the loosely typed shape of what arrives
//! over the wire. It is validated exactly once into a [`Mutation`], which only
//! carries well-formed parent references, and then applied to the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TodoError};
use crate::id::{ItemId, ListId};
use crate::models::{Item, List, ParentKind, ParentRef};
use crate::store::TreeStore;

// ============================================================
// Request payloads
// ============================================================

/// Body for creating or retitling a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPayload {
    pub title: Option<String>,
}

/// Body for updating an item's content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPayload {
    pub content: Option<String>,
}

/// Body for creating an item under a list or another item.
///
/// The parent type is kept as raw JSON so that any value other than the two
/// accepted strings is reported as an invalid parent rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    /// `"list"` or `"item"`.
    pub parent_type: Option<Value>,
    pub parent_id: Option<String>,
    /// Defaults to the empty string.
    pub content: Option<String>,
}

/// Body for re-parenting an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemPayload {
    pub item_id: Option<String>,
    /// `"list"` or `"item"`.
    pub target_parent_type: Option<Value>,
    pub target_parent_id: Option<String>,
    /// Accepted in any shape and ignored. Sibling order is not stored.
    pub target_index: Option<Value>,
}

/// An unvalidated mutation, tagged by `kind`.
///
/// ```json
/// { "kind": "CreateItem", "parentType": "list", "parentId": "...", "content": "buy milk" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MutationRequest {
    CreateList(ListPayload),
    UpdateList {
        id: String,
        title: Option<String>,
    },
    DeleteList {
        id: String,
    },
    CreateItem(CreateItemPayload),
    UpdateItem {
        id: String,
        content: Option<String>,
    },
    DeleteItem {
        id: String,
    },
    MoveItem(MoveItemPayload),
}

impl MutationRequest {
    /// Checks parent kinds and required identifiers and applies creation defaults.
    pub fn validate(self) -> Result<Mutation> {
        let mutation = match self {
            Self::CreateList(payload) => Mutation::CreateList {
                title: payload.title,
            },
            Self::UpdateList { id, title } => Mutation::UpdateList {
                id: ListId::from(id),
                title,
            },
            Self::DeleteList { id } => Mutation::DeleteList(ListId::from(id)),
            Self::CreateItem(payload) => Mutation::CreateItem {
                parent: parse_parent(payload.parent_type, payload.parent_id, "parentId")?,
                content: payload.content.unwrap_or_default(),
            },
            Self::UpdateItem { id, content } => Mutation::UpdateItem {
                id: ItemId::from(id),
                content,
            },
            Self::DeleteItem { id } => Mutation::DeleteItem(ItemId::from(id)),
            Self::MoveItem(payload) => {
                let item = payload
                    .item_id
                    .map(ItemId::from)
                    .ok_or(TodoError::InvalidRequest("itemId"))?;
                let target = parse_parent(
                    payload.target_parent_type,
                    payload.target_parent_id,
                    "targetParentId",
                )?;
                Mutation::MoveItem { item, target }
            }
        };
        Ok(mutation)
    }
}

fn parse_parent(
    kind: Option<Value>,
    id: Option<String>,
    id_field: &'static str,
) -> Result<ParentRef> {
    let Some(parsed) = kind
        .as_ref()
        .and_then(Value::as_str)
        .and_then(ParentKind::from_str)
    else {
        return Err(TodoError::InvalidParent(kind.map(|raw| match raw {
            Value::String(s) => s,
            other => other.to_string(),
        })));
    };
    let id = id.ok_or(TodoError::InvalidRequest(id_field))?;
    Ok(parsed.with_id(id))
}

// ============================================================
// Validated mutations
// ============================================================

/// A mutation that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateList { title: Option<String> },
    /// `None` keeps the current title.
    UpdateList { id: ListId, title: Option<String> },
    DeleteList(ListId),
    CreateItem { parent: ParentRef, content: String },
    /// `None` keeps the current content.
    UpdateItem { id: ItemId, content: Option<String> },
    DeleteItem(ItemId),
    MoveItem { item: ItemId, target: ParentRef },
}

/// What a successfully applied mutation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    ListCreated(List),
    ListUpdated(List),
    ListDeleted(ListId),
    ItemCreated(Item),
    ItemUpdated(Item),
    ItemMoved(Item),
    ItemDeleted(ItemId),
}

// ============================================================
// Service
// ============================================================

/// Entry point for every change to the tree.
#[derive(Clone)]
pub struct MutationService<S> {
    store: S,
}

impl<S: TreeStore> MutationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and applies a raw request.
    pub fn submit(&self, request: MutationRequest) -> Result<MutationOutcome> {
        let mutation = request.validate().inspect_err(|e| {
            tracing::warn!("Rejected mutation: {}", e);
        })?;
        self.apply(mutation)
    }

    pub fn apply(&self, mutation: Mutation) -> Result<MutationOutcome> {
        tracing::debug!(?mutation, "Applying mutation");

        match mutation {
            Mutation::CreateList { title } => {
                self.store.create_list(title).map(MutationOutcome::ListCreated)
            }
            Mutation::UpdateList { id, title } => match title {
                Some(title) => self.store.update_list_title(&id, title),
                None => self.store.get_list(&id),
            }
            .map(MutationOutcome::ListUpdated),
            Mutation::DeleteList(id) => self
                .store
                .delete_list(&id)
                .map(|()| MutationOutcome::ListDeleted(id)),
            Mutation::CreateItem { parent, content } => self
                .store
                .create_item(&parent, content)
                .map(MutationOutcome::ItemCreated),
            Mutation::UpdateItem { id, content } => match content {
                Some(content) => self.store.update_item_content(&id, content),
                None => self.store.get_item(&id),
            }
            .map(MutationOutcome::ItemUpdated),
            Mutation::DeleteItem(id) => self
                .store
                .delete_item(&id)
                .map(|()| MutationOutcome::ItemDeleted(id)),
            Mutation::MoveItem { item, target } => self
                .store
                .move_item(&item, &target)
                .map(MutationOutcome::ItemMoved),
        }
    }
}
