//! Request correlation ids, backed by `tower_http::request_id`.
//!
//! A caller-supplied `x-request-id` is kept as is; otherwise a UUID v4 is
//! generated. The id is echoed on the response and recorded on the trace span.

use axum::{body::Body, extract::Request, http::HeaderName};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns an id to requests that arrive without one
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid)
}

/// Copies the request id onto the response
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(REQUEST_ID_HEADER)
}

/// Log-friendly form of the id; non-ASCII header bytes are reported as such
pub fn request_id_str(id: &RequestId) -> &str {
    id.header_value().to_str().unwrap_or("<non-ascii>")
}

/// Span for `TraceLayer`, carrying method, uri and request id
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(request_id_str)
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_str() {
        let id = RequestId::new(HeaderValue::from_static("3f2c9a7e-req"));
        assert_eq!(request_id_str(&id), "3f2c9a7e-req");

        let id = RequestId::new(HeaderValue::from_bytes(b"caf\xe9").unwrap());
        assert_eq!(request_id_str(&id), "<non-ascii>");
    }

    #[test]
    fn test_span_without_request_id_is_still_created() {
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let _span = make_span_with_request_id(&request);
    }
}
