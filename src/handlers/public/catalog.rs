use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::{Collection, Document, DocumentStore, Filter};
use crate::error::ApiError;

/// GET /menu
pub async fn list_menu(State(store): State<Arc<dyn DocumentStore>>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(store.find(Collection::Menu, &Filter::All).await?))
}

/// GET /menu/:id
pub async fn get_menu_item(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    store
        .find_one(Collection::Menu, &Filter::id(&id)?)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Menu item {} not found", id)))
}

/// GET /reviews
pub async fn list_reviews(State(store): State<Arc<dyn DocumentStore>>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(store.find(Collection::Reviews, &Filter::All).await?))
}
