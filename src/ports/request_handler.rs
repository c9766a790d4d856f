//! Buffered request handler port.
//!
//! The transport gateway serves a streaming, connection-level protocol; the
//! application router consumes a buffered representation of each request.
//! This port fixes that buffered contract: headers are fully materialized
//! (multi-valued headers joined with commas), the URL is absolute, and the
//! body, when present, is a live stream of byte chunks rather than a
//! buffered blob.

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::Serialize;
use thiserror::Error;

/// Boxed error type carried by body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A stream of body byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + 'static>>;

/// Buffered request representation handed to the application router.
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL: the request path resolved against the configured base.
    pub url: Uri,
    /// All incoming headers, multi-valued headers joined with commas.
    pub headers: HashMap<String, String>,
    /// Request body as a live byte stream; `None` for GET/HEAD.
    pub body: Option<ByteStream>,
}

/// Body of a buffered handler response.
pub enum ApiBody {
    Empty,
    Full(Bytes),
    Stream(ByteStream),
}

/// Buffered response representation returned by the application router.
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ApiBody,
}

impl ApiResponse {
    /// A plaintext response.
    pub fn text(status: StatusCode, body: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status,
            headers,
            body: ApiBody::Full(Bytes::copy_from_slice(body.as_bytes())),
        }
    }

    /// A JSON response serialized from a DTO.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        let body =
            serde_json::to_vec(value).expect("response serialization should not fail");
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        Self {
            status,
            headers,
            body: ApiBody::Full(Bytes::from(body)),
        }
    }
}

/// Failure of the buffered handler itself.
///
/// The gateway turns these into a 500 response carrying the error's string
/// form, with CORS headers attached.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("internal handler failure: {0}")]
    Internal(String),
}

/// Port for the buffered application handler the gateway drives.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle one buffered request. Invoked exactly once per request.
    async fn handle(&self, request: ApiRequest) -> Result<ApiResponse, HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_handler_is_object_safe() {
        fn assert_object_safe(_handler: Option<&dyn RequestHandler>) {}
        assert_object_safe(None);
    }

    #[test]
    fn text_response_sets_content_type() {
        let response = ApiResponse::text(StatusCode::OK, "Server is running");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn json_response_serializes_value() {
        #[derive(Serialize)]
        struct Payload {
            success: bool,
        }

        let response = ApiResponse::json(StatusCode::OK, &Payload { success: true });
        let ApiBody::Full(body) = response.body else {
            panic!("expected full body");
        };
        assert_eq!(&body[..], br#"{"success":true}"#);
    }
}
