use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::TitleStore,
    middleware::request_id::{
        make_span_with_request_id, propagate_request_id_layer, set_request_id_layer,
    },
    services::embedding::Embedder,
};

pub mod invoke;
pub mod recommendations;
pub mod titles;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TitleStore>,
    pub embedder: Arc<dyn Embedder>,
    /// Title table, validated as an identifier at startup
    pub table: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TitleStore>,
        embedder: Arc<dyn Embedder>,
        table: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            embedder,
            table: table.into(),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .nest("/invoke", invoke_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(propagate_request_id_layer())
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recommendations",
            get(recommendations::recommend).post(recommendations::recommend),
        )
        .route("/titles/search", get(titles::search))
}

/// Raw envelope routes under /invoke
fn invoke_routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(invoke::recommend))
        .route("/search", post(invoke::search))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Folds query pairs into envelope parameters; repeated keys become lists
pub(crate) fn query_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    map
}
