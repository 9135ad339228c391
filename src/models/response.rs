use std::collections::BTreeMap;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;

use super::{Recommendation, SearchResult};

/// Body of a successful search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub titles: Vec<SearchResult>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
}

/// Normalized response handed back to the invocation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Transport form of [`ResponseEnvelope`]: the body is already a JSON string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

impl ResponseEnvelope {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status_code: status.as_u16(),
            headers: json_headers(),
            body,
        }
    }

    pub fn recommendations(recommendations: Vec<Recommendation>) -> Self {
        Self::new(
            StatusCode::OK,
            json!({ "recommendations": recommendations }),
        )
    }

    pub fn recommend_error(error: &AppError) -> Self {
        Self::new(
            error.status_code(),
            json!({
                "message": "Invalid request",
                "error": error.to_string(),
            }),
        )
    }

    pub fn search_page(page: SearchPage) -> Self {
        Self::new(StatusCode::OK, json!(page))
    }

    /// Search errors keep their historical `"error message"` key
    pub fn search_error(error: &AppError) -> Self {
        Self::new(error.status_code(), json!({ "error message": error.to_string() }))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_wire(self) -> WireResponse {
        WireResponse {
            status_code: self.status_code,
            headers: self.headers,
            body: self.body.to_string(),
        }
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = self.status();
        let wire = self.into_wire();

        let mut response = (status, wire.body).into_response();
        for (name, value) in &wire.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping unrepresentable response header"),
            }
        }
        response
    }
}
