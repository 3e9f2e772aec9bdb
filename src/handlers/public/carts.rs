use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::database::{Collection, DeleteResult, Document, DocumentStore, Filter, InsertResult};
use crate::error::ApiError;
use crate::handlers::JsonObject;

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: Option<String>,
}

/// GET /carts?email=
pub async fn list_cart_items(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(query): Query<CartQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'email' is required"))?;

    Ok(Json(store.find(Collection::Carts, &Filter::eq("email", email)).await?))
}

/// POST /carts
pub async fn add_cart_item(
    State(store): State<Arc<dyn DocumentStore>>,
    JsonObject(item): JsonObject,
) -> Result<Json<InsertResult>, ApiError> {
    Ok(Json(store.insert_one(Collection::Carts, item).await?))
}

/// DELETE /carts/:id
pub async fn delete_cart_item(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    Ok(Json(store.delete_one(Collection::Carts, &Filter::id(&id)?).await?))
}
