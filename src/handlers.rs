//! Envelope-in, envelope-out request handlers.
//!
//! Each handler normalizes the envelope, runs the matching service and shapes
//! the outcome. Failures never escape; they become error envelopes.

use crate::{
    models::{RecommendRequest, RequestEnvelope, ResponseEnvelope, SearchRequest},
    routes::AppState,
    services::{recommendations, title_search},
};

/// Recommend titles by `titleId` or by plot description
pub async fn handle_recommend(state: &AppState, envelope: RequestEnvelope) -> ResponseEnvelope {
    let request = match RecommendRequest::from_envelope(envelope) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected recommendation request");
            return ResponseEnvelope::recommend_error(&e);
        }
    };

    let path = match &request {
        RecommendRequest::ByTitleId { .. } => "title_id",
        RecommendRequest::ByPlot { .. } => "plot",
    };
    tracing::info!(
        path,
        limit = request.limit(),
        filtered = !request.filter().is_empty(),
        "Processing recommendation request"
    );

    match recommendations::get_recommendations(
        state.store.as_ref(),
        state.embedder.as_ref(),
        &state.table,
        &request,
    )
    .await
    {
        Ok(recommendations) => {
            tracing::info!(path, count = recommendations.len(), "Recommendations ready");
            ResponseEnvelope::recommendations(recommendations)
        }
        Err(e) => {
            tracing::error!(path, error = %e, "Recommendation failed");
            ResponseEnvelope::recommend_error(&e)
        }
    }
}

/// Full-text search with pagination
pub async fn handle_search(state: &AppState, envelope: RequestEnvelope) -> ResponseEnvelope {
    let request = match SearchRequest::from_envelope(envelope) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected search request");
            return ResponseEnvelope::search_error(&e);
        }
    };

    tracing::info!(page = request.page, "Processing search request");

    match title_search::search_titles(state.store.as_ref(), &state.table, &request).await {
        Ok(page) => {
            tracing::info!(
                total_items = page.total_items,
                returned = page.titles.len(),
                "Search completed"
            );
            ResponseEnvelope::search_page(page)
        }
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            ResponseEnvelope::search_error(&e)
        }
    }
}
