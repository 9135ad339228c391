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

/// Handler for the recommendations endpoint
///
/// `GET` carries everything in the query string (by-title path); `POST` adds a
/// JSON body with `plot` and `filters` (by-plot path).
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<Vec<(String, String)>>,
    body: String,
) -> ResponseEnvelope {
    tracing::info!(
        request_id = request_id_str(&request_id),
        params = params.len(),
        has_body = !body.is_empty(),
        "Recommendation request received"
    );

    let body = (!body.trim().is_empty()).then_some(body);
    let envelope = RequestEnvelope::new(query_map(params), body);

    let response = handlers::handle_recommend(&state, envelope).await;

    tracing::info!(
        request_id = request_id_str(&request_id),
        status = response.status_code,
        "Recommendation request completed"
    );

    response
}
