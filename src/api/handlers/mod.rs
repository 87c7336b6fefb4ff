use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::db::Database;
use crate::hierarchy;
use crate::models::*;
use crate::service::*;
use crate::{ItemId, ListId, TodoError, TreeStore};

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a core error onto a status code.
///
/// Missing entities and caller mistakes are returned as-is. Store failures are
/// logged in full but the client only sees a generic message.
fn error_response(e: TodoError) -> (StatusCode, String) {
    if e.is_not_found() {
        tracing::debug!("Not found: {}", e);
        return (StatusCode::NOT_FOUND, e.to_string());
    }

    if e.is_invalid() {
        tracing::warn!("Validation error: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string());
    }

    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// New lists and items come back in their tree shape, deletions as a message and
/// other changes as the entity.
fn outcome_response(outcome: MutationOutcome) -> Response {
    match outcome {
        MutationOutcome::ListCreated(list) => {
            (StatusCode::CREATED, Json(ListTree::from(list))).into_response()
        }
        MutationOutcome::ItemCreated(item) => {
            (StatusCode::CREATED, Json(ItemNode::from(item))).into_response()
        }
        MutationOutcome::ListUpdated(list) => Json(list).into_response(),
        MutationOutcome::ItemUpdated(item) | MutationOutcome::ItemMoved(item) => {
            Json(item).into_response()
        }
        MutationOutcome::ListDeleted(_) => {
            Json(serde_json::json!({ "message": "List deleted" })).into_response()
        }
        MutationOutcome::ItemDeleted(_) => {
            Json(serde_json::json!({ "message": "Item deleted" })).into_response()
        }
    }
}

fn submit(db: Database, request: MutationRequest) -> ApiResult<Response> {
    MutationService::new(db)
        .submit(request)
        .map(outcome_response)
        .map_err(error_response)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Lists
// ============================================================

/// Every hierarchy as an object keyed by list id.
pub async fn list_lists(State(db): State<Database>) -> ApiResult<Json<ListIndex>> {
    hierarchy::all_trees(&db)
        .map(|trees| Json(ListIndex::from(trees)))
        .map_err(error_response)
}

pub async fn get_list(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Json<ListTree>> {
    hierarchy::list_tree(&db, &ListId::from(id))
        .map(Json)
        .map_err(error_response)
}

pub async fn create_list(
    State(db): State<Database>,
    Json(payload): Json<ListPayload>,
) -> ApiResult<Response> {
    submit(db, MutationRequest::CreateList(payload))
}

pub async fn update_list(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(payload): Json<ListPayload>,
) -> ApiResult<Response> {
    submit(
        db,
        MutationRequest::UpdateList {
            id,
            title: payload.title,
        },
    )
}

pub async fn delete_list(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    submit(db, MutationRequest::DeleteList { id })
}

// ============================================================
// Items
// ============================================================

pub async fn create_item(
    State(db): State<Database>,
    Json(payload): Json<CreateItemPayload>,
) -> ApiResult<Response> {
    submit(db, MutationRequest::CreateItem(payload))
}

pub async fn get_item(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Json<Item>> {
    db.get_item(&ItemId::from(id))
        .map(Json)
        .map_err(error_response)
}

pub async fn update_item(
    State(db): State<Database>,
    Path(id): Path<String>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<Response> {
    submit(
        db,
        MutationRequest::UpdateItem {
            id,
            content: payload.content,
        },
    )
}

pub async fn delete_item(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    submit(db, MutationRequest::DeleteItem { id })
}

pub async fn move_item(
    State(db): State<Database>,
    Json(payload): Json<MoveItemPayload>,
) -> ApiResult<Response> {
    submit(db, MutationRequest::MoveItem(payload))
}

// ============================================================
// Tagged mutations
// ============================================================

/// Applies any [`MutationRequest`], e.g. `{"kind": "DeleteItem", "id": "..."}`.
pub async fn apply_mutation(
    State(db): State<Database>,
    Json(request): Json<MutationRequest>,
) -> ApiResult<Response> {
    submit(db, request)
}
