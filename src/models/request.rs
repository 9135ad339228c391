use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

use super::de;

/// Raw request envelope as handed over by the invocation layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub query_string_parameters: Option<Map<String, Value>>,
    /// Raw body text, or an already-parsed JSON object
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
}

impl RequestEnvelope {
    /// Reads an envelope from arbitrary JSON; a wrongly shaped envelope is a
    /// validation failure like any other malformed request
    pub fn from_value(value: Value) -> AppResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("Invalid request envelope: {}", e)))
    }

    pub fn new(query: Map<String, Value>, body: Option<String>) -> Self {
        Self {
            query_string_parameters: Some(query),
            body: body.map(Value::String),
            is_base64_encoded: Some(false),
        }
    }
}

/// Optional constraints shared by both recommendation paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub release_period: Vec<String>,
    pub title_type: Vec<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.release_period.is_empty()
            && self.title_type.is_empty()
            && self.min_rating.is_none()
            && self.max_rating.is_none()
    }
}

/// A validated recommendation request
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendRequest {
    /// Nearest neighbours of a title already in the catalogue
    ByTitleId {
        title_id: i64,
        filter: Filter,
        limit: i64,
    },
    /// Nearest neighbours of a free-text plot description
    ByPlot {
        plot: String,
        filter: Filter,
        limit: i64,
    },
}

/// A validated full-text search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub search_text: String,
    pub page: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterParams {
    #[serde(default, deserialize_with = "de::string_list")]
    release_period: Option<Vec<String>>,
    #[serde(default, rename = "type", deserialize_with = "de::string_list")]
    title_type: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de::optional_number")]
    min_rating: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    max_rating: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_int")]
    limit: Option<i64>,
}

impl FilterParams {
    fn into_filter(self) -> Filter {
        Filter {
            release_period: self.release_period.unwrap_or_default(),
            title_type: self.title_type.unwrap_or_default(),
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendQuery {
    #[serde(default, deserialize_with = "de::optional_int")]
    title_id: Option<i64>,
    #[serde(flatten)]
    filter: FilterParams,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendBody {
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    filters: Option<FilterParams>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Option<String>,
    #[serde(default, deserialize_with = "de::optional_int")]
    page: Option<i64>,
}

impl RecommendRequest {
    /// Decodes and validates a recommendation envelope.
    ///
    /// `titleId` selects the by-title path and requires a query `limit`; otherwise
    /// `plot` selects the by-plot path and requires `filters.limit` in the body.
    pub fn from_envelope(envelope: RequestEnvelope) -> AppResult<Self> {
        let query = envelope.query_string_parameters.unwrap_or_default();
        let body = decode_body(envelope.body, envelope.is_base64_encoded.unwrap_or(false))?;

        if query.is_empty() && body.is_empty() {
            return Err(AppError::validation(
                "Either 'queryStringParameters' or 'body' must be provided.",
            ));
        }

        let query: RecommendQuery = parse_section(query, "query parameters")?;
        let body: RecommendBody = parse_section(body, "body")?;
        let plot = body.plot.filter(|plot| !plot.trim().is_empty());

        match (query.title_id, plot) {
            (None, None) => Err(AppError::validation(
                "Either 'titleId' (query parameter) or 'plot' (body) must be provided.",
            )),
            (Some(title_id), _) => {
                let limit = query.filter.limit.ok_or_else(|| {
                    AppError::validation(
                        "'limit' query parameter is required when 'titleId' is provided.",
                    )
                })?;
                Ok(RecommendRequest::ByTitleId {
                    title_id,
                    limit: non_negative_limit(limit)?,
                    filter: query.filter.into_filter(),
                })
            }
            (None, Some(plot)) => {
                let filters = body.filters.unwrap_or_default();
                let limit = filters.limit.ok_or_else(|| {
                    AppError::validation(
                        "'limit' must be provided in 'filters' when 'plot' is provided.",
                    )
                })?;
                Ok(RecommendRequest::ByPlot {
                    plot,
                    limit: non_negative_limit(limit)?,
                    filter: filters.into_filter(),
                })
            }
        }
    }

    pub fn limit(&self) -> i64 {
        match self {
            RecommendRequest::ByTitleId { limit, .. } | RecommendRequest::ByPlot { limit, .. } => {
                *limit
            }
        }
    }

    pub fn filter(&self) -> &Filter {
        match self {
            RecommendRequest::ByTitleId { filter, .. }
            | RecommendRequest::ByPlot { filter, .. } => filter,
        }
    }
}

impl SearchRequest {
    /// Validates a search envelope; `page` defaults to the first page
    pub fn from_envelope(envelope: RequestEnvelope) -> AppResult<Self> {
        let query: SearchQuery = parse_section(
            envelope.query_string_parameters.unwrap_or_default(),
            "query parameters",
        )?;

        let search_text = query
            .search
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AppError::validation("'search' query parameter is required."))?;

        let page = match query.page {
            None => 1,
            Some(page) if page >= 1 => u32::try_from(page)
                .map_err(|_| AppError::validation("'page' is out of range."))?,
            Some(_) => return Err(AppError::validation("'page' must be a positive integer.")),
        };

        Ok(Self { search_text, page })
    }
}

/// Turns the envelope body into a JSON object, decoding base64 first when flagged
fn decode_body(body: Option<Value>, is_base64_encoded: bool) -> AppResult<Map<String, Value>> {
    let text = match body {
        None | Some(Value::Null) => return Ok(Map::new()),
        Some(Value::Object(map)) => return Ok(map),
        Some(Value::String(text)) => text,
        Some(_) => return Err(AppError::validation("Request body must be a JSON object.")),
    };

    let text = if is_base64_encoded && !text.is_empty() {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|e| AppError::validation(format!("Invalid base64 body: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::validation(format!("Body is not valid UTF-8: {}", e)))?
    } else {
        text
    };

    if text.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(AppError::validation("Request body must be a JSON object.")),
        Err(e) => Err(AppError::validation(format!(
            "Request body is not valid JSON: {}",
            e
        ))),
    }
}

fn parse_section<T: DeserializeOwned>(section: Map<String, Value>, name: &str) -> AppResult<T> {
    serde_json::from_value(Value::Object(section))
        .map_err(|e| AppError::validation(format!("Invalid {}: {}", name, e)))
}

fn non_negative_limit(limit: i64) -> AppResult<i64> {
    if limit < 0 {
        return Err(AppError::validation("'limit' must not be negative."));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> RequestEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_wrongly_shaped_envelope_is_a_validation_error() {
        let err = RequestEnvelope::from_value(json!({
            "queryStringParameters": {"titleId": 1, "limit": 2},
            "isBase64Encoded": "false"
        }))
        .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Invalid request envelope"));

        let err = RequestEnvelope::from_value(json!({
            "queryStringParameters": "titleId=1&limit=2"
        }))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_envelope_from_value_keeps_fields() {
        let envelope = RequestEnvelope::from_value(json!({
            "queryStringParameters": {"search": "alien"},
            "body": null,
            "isBase64Encoded": false
        }))
        .unwrap();
        assert_eq!(envelope.query_string_parameters.unwrap()["search"], "alien");
        assert_eq!(envelope.is_base64_encoded, Some(false));
    }

    fn validation_message(result: AppResult<RecommendRequest>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_query_and_body_is_rejected() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({}))));
        assert!(msg.contains("'queryStringParameters' or 'body'"));

        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": null,
            "body": ""
        }))));
        assert!(msg.contains("'queryStringParameters' or 'body'"));
    }

    #[test]
    fn test_neither_title_id_nor_plot_is_rejected() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"limit": 5},
            "body": "{\"filters\": {\"limit\": 5}}"
        }))));
        assert!(msg.contains("'titleId' (query parameter) or 'plot' (body)"));
    }

    #[test]
    fn test_title_id_without_limit_is_rejected() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"titleId": 42}
        }))));
        assert!(msg.contains("'limit' query parameter is required"));
    }

    #[test]
    fn test_title_id_with_limit_passes() {
        let request = RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {
                "titleId": "42",
                "limit": "5",
                "releasePeriod": ["2020s"],
                "type": "movie",
                "minRating": "7"
            }
        })))
        .unwrap();

        assert_eq!(
            request,
            RecommendRequest::ByTitleId {
                title_id: 42,
                limit: 5,
                filter: Filter {
                    release_period: vec!["2020s".to_string()],
                    title_type: vec!["movie".to_string()],
                    min_rating: Some(7.0),
                    max_rating: None,
                },
            }
        );
    }

    #[test]
    fn test_plot_without_filter_limit_is_rejected() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "body": "{\"plot\": \"a heist in space\", \"filters\": {\"type\": [\"movie\"]}}"
        }))));
        assert!(msg.contains("'limit' must be provided in 'filters'"));

        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "body": {"plot": "a heist in space"}
        }))));
        assert!(msg.contains("'limit' must be provided in 'filters'"));
    }

    #[test]
    fn test_plot_with_filter_limit_passes() {
        let request = RecommendRequest::from_envelope(envelope(json!({
            "body": "{\"plot\": \"a heist in space\", \"filters\": {\"limit\": 3, \"maxRating\": 8.5}}"
        })))
        .unwrap();

        assert_eq!(
            request,
            RecommendRequest::ByPlot {
                plot: "a heist in space".to_string(),
                limit: 3,
                filter: Filter {
                    max_rating: Some(8.5),
                    ..Filter::default()
                },
            }
        );
    }

    #[test]
    fn test_title_id_wins_over_plot() {
        let request = RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"titleId": 7, "limit": 2},
            "body": {"plot": "ignored"}
        })))
        .unwrap();

        assert!(matches!(
            request,
            RecommendRequest::ByTitleId { title_id: 7, limit: 2, .. }
        ));
    }

    #[test]
    fn test_plot_does_not_need_filter_limit_when_title_id_given() {
        let request = RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"titleId": 7, "limit": 4},
            "body": {"plot": "space", "filters": {}}
        })));
        assert!(request.is_ok());
    }

    #[test]
    fn test_base64_body_is_decoded() {
        let encoded = BASE64.encode(r#"{"plot": "two robots fall in love", "filters": {"limit": 10}}"#);
        let request = RecommendRequest::from_envelope(envelope(json!({
            "body": encoded,
            "isBase64Encoded": true
        })))
        .unwrap();

        assert_eq!(request.limit(), 10);
        assert!(matches!(request, RecommendRequest::ByPlot { ref plot, .. } if plot == "two robots fall in love"));
    }

    #[test]
    fn test_bad_base64_is_a_validation_error() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "body": "%%% not base64 %%%",
            "isBase64Encoded": true
        }))));
        assert!(msg.contains("base64"));
    }

    #[test]
    fn test_malformed_json_body_is_a_validation_error() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "body": "{\"plot\": "
        }))));
        assert!(msg.contains("not valid JSON"));
    }

    #[test]
    fn test_wrongly_typed_title_id_is_a_validation_error() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"titleId": "abc", "limit": 5}
        }))));
        assert!(msg.starts_with("Invalid query parameters"));
    }

    #[test]
    fn test_negative_limit_is_rejected() {
        let msg = validation_message(RecommendRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"titleId": 1, "limit": -1}
        }))));
        assert!(msg.contains("negative"));
    }

    #[test]
    fn test_search_defaults_to_first_page() {
        let request = SearchRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"search": "star wars"}
        })))
        .unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.search_text, "star wars");
    }

    #[test]
    fn test_search_accepts_string_page() {
        let request = SearchRequest::from_envelope(envelope(json!({
            "queryStringParameters": {"search": "alien", "page": "3"}
        })))
        .unwrap();
        assert_eq!(request.page, 3);
    }

    #[test]
    fn test_search_requires_text() {
        assert!(matches!(
            SearchRequest::from_envelope(envelope(json!({}))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            SearchRequest::from_envelope(envelope(json!({
                "queryStringParameters": {"search": "   "}
            }))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_search_rejects_non_positive_page() {
        assert!(matches!(
            SearchRequest::from_envelope(envelope(json!({
                "queryStringParameters": {"search": "alien", "page": 0}
            }))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            SearchRequest::from_envelope(envelope(json!({
                "queryStringParameters": {"search": "alien", "page": "two"}
            }))),
            Err(AppError::Validation(_))
        ));
    }
}
