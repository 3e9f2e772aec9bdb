use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::database::{
    Collection, DeleteResult, DocumentStore, Filter, InsertResult, MenuItemPatch, UpdateResult,
};
use crate::error::ApiError;
use crate::handlers::JsonObject;

/// POST /menu
pub async fn create_menu_item(
    State(store): State<Arc<dyn DocumentStore>>,
    JsonObject(item): JsonObject,
) -> Result<Json<InsertResult>, ApiError> {
    let result = store.insert_one(Collection::Menu, item).await?;
    tracing::info!(item_id = ?result.inserted_id, "Created menu item");
    Ok(Json(result))
}

/// PATCH /menu/:id - only name, category, price, recipe and image are editable.
pub async fn update_menu_item(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<Json<UpdateResult>, ApiError> {
    let filter = Filter::id(&id)?;
    let patch: MenuItemPatch = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::bad_request(format!("Invalid menu item: {}", e)))?;

    Ok(Json(store.update_one(Collection::Menu, &filter, patch.into_set()).await?))
}

/// DELETE /menu/:id
pub async fn delete_menu_item(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = store.delete_one(Collection::Menu, &Filter::id(&id)?).await?;
    tracing::info!(item_id = %id, deleted = result.deleted_count, "Deleted menu item");
    Ok(Json(result))
}
