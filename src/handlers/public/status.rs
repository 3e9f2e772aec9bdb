use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::database::DocumentStore;
use crate::error::ApiError;

/// GET /
pub async fn banner() -> &'static str {
    "bistro boss is running!"
}

/// GET /health - store reachability
pub async fn health(State(store): State<Arc<dyn DocumentStore>>) -> Result<Json<Value>, ApiError> {
    store.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "store": store.backend(),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
