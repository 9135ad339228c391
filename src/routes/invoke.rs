//! Gateway-style invocation: the request body is a raw envelope and the reply
//! is the envelope with its body serialized to a JSON string.
//!
//! Malformed envelopes are answered with an error envelope, never with the
//! extractor's own rejection.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;
use tower_http::request_id::RequestId;

use crate::{
    error::{AppError, AppResult},
    handlers,
    middleware::request_id::request_id_str,
    models::{RequestEnvelope, ResponseEnvelope, WireResponse},
    routes::AppState,
};

pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<WireResponse> {
    tracing::info!(
        request_id = request_id_str(&request_id),
        "Invoking recommend handler"
    );
    let response = match read_envelope(payload) {
        Ok(envelope) => handlers::handle_recommend(&state, envelope).await,
        Err(e) => {
            tracing::warn!(
                request_id = request_id_str(&request_id),
                error = %e,
                "Rejected recommend envelope"
            );
            ResponseEnvelope::recommend_error(&e)
        }
    };
    Json(response.into_wire())
}

pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<WireResponse> {
    tracing::info!(
        request_id = request_id_str(&request_id),
        "Invoking search handler"
    );
    let response = match read_envelope(payload) {
        Ok(envelope) => handlers::handle_search(&state, envelope).await,
        Err(e) => {
            tracing::warn!(
                request_id = request_id_str(&request_id),
                error = %e,
                "Rejected search envelope"
            );
            ResponseEnvelope::search_error(&e)
        }
    };
    Json(response.into_wire())
}

fn read_envelope(payload: Result<Json<Value>, JsonRejection>) -> AppResult<RequestEnvelope> {
    let Json(value) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    RequestEnvelope::from_value(value)
}
