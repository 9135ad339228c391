use axum::{
    extract::{Query, State},
    Extension,
};
use tower_http::request_id::RequestId;

use crate::{
    handlers,
    middleware::request_id::request_id_str,
    models::{RequestEnvelope, ResponseEnvelope},
    routes::{query_map, AppState},
};

/// Handler for title search endpoint
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<Vec<(String, String)>>,
) -> ResponseEnvelope {
    let envelope = RequestEnvelope::new(query_map(params), None);
    let response = handlers::handle_search(&state, envelope).await;

    tracing::info!(
        request_id = request_id_str(&request_id),
        status = response.status_code,
        "Search request completed"
    );

    response
}
