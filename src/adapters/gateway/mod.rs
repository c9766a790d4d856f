//! Transport gateway bridging two request-handling abstractions.
//!
//! The serving stack speaks a streaming, connection-level model
//! (`tower::Service` over `http::Request`/`Response` with streaming bodies);
//! the application router consumes the buffered representation defined by
//! the `RequestHandler` port. The gateway converts between the two:
//!
//! 1. `OPTIONS` preflight requests are answered here and never reach the
//!    handler.
//! 2. Other requests are normalized (absolute URL, comma-joined headers,
//!    body attached as a live byte stream except for GET/HEAD) and the
//!    handler is invoked exactly once.
//! 3. Response bodies are forwarded chunk-by-chunk without buffering, and
//!    the configured CORS headers are asserted before anything is flushed.
//! 4. Any failure, whether a handler rejection or a body stream error
//!    before the first chunk, yields a 500 carrying the error's string
//!    form, with the CORS headers re-asserted so browsers surface the real
//!    failure instead of an opaque CORS error.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use futures::{future, StreamExt, TryStreamExt};
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use tower::Service;

use crate::ports::{ApiBody, ApiRequest, ApiResponse, BoxError, ByteStream, RequestHandler};

/// Configuration the gateway derives CORS and URL resolution from.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Origin allowed to call the API from a browser.
    pub client_origin: String,

    /// Externally visible base URL request paths are resolved against.
    pub base_url: String,
}

/// The transport adapter, usable directly as a tower service.
#[derive(Clone)]
pub struct Gateway {
    handler: Arc<dyn RequestHandler>,
    config: Arc<GatewayConfig>,
}

impl Gateway {
    /// Creates a gateway driving the given buffered handler.
    pub fn new(handler: Arc<dyn RequestHandler>, config: GatewayConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }

    /// Handle one transport-level request.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        if request.method() == Method::OPTIONS {
            return self.preflight(request.headers());
        }

        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let absolute = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            path_and_query
        );
        let url: Uri = match absolute.parse() {
            Ok(url) => url,
            Err(err) => return self.failure(&err),
        };

        let mut headers = HashMap::new();
        for name in parts.headers.keys() {
            let joined = parts
                .headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect::<Vec<_>>()
                .join(",");
            headers.insert(name.as_str().to_string(), joined);
        }

        let body = if parts.method == Method::GET || parts.method == Method::HEAD {
            None
        } else {
            let stream: ByteStream =
                Box::pin(body.into_data_stream().map_err(|err| Box::new(err) as BoxError));
            Some(stream)
        };

        let api_request = ApiRequest {
            method: parts.method,
            url,
            headers,
            body,
        };

        match self.handler.handle(api_request).await {
            Ok(response) => self.forward(response).await,
            Err(err) => self.failure(&err),
        }
    }

    /// Answer a CORS preflight without touching the handler.
    fn preflight(&self, request_headers: &HeaderMap) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        if let Ok(origin) = HeaderValue::from_str(&self.config.client_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        let allow_headers = request_headers
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        response
    }

    /// Convert a buffered handler response into a transport response.
    async fn forward(&self, response: ApiResponse) -> Response<Body> {
        let ApiResponse {
            status,
            mut headers,
            body,
        } = response;

        // Inserted after the handler's headers so the configured values
        // always survive a conflict, and before any body byte is flushed.
        self.apply_cors(&mut headers);

        let body = match body {
            ApiBody::Empty => Body::empty(),
            ApiBody::Full(bytes) => Body::from(bytes),
            ApiBody::Stream(mut stream) => {
                // Peek the first chunk: until something has flushed, the
                // whole response can still be replaced by the failure path.
                let first = stream.next().await;
                if let Some(Err(err)) = &first {
                    return self.failure(err);
                }
                // Headers are immutable once data flows; a later stream
                // error can only be logged and the body closed.
                let guarded = futures::stream::iter(first).chain(stream).scan(
                    (),
                    |_, item| {
                        future::ready(match item {
                            Ok(chunk) => Some(Ok::<Bytes, BoxError>(chunk)),
                            Err(err) => {
                                tracing::error!(
                                    error = %err,
                                    "response stream failed mid-body, closing"
                                );
                                None
                            }
                        })
                    },
                );
                Body::from_stream(guarded)
            }
        };

        let mut out = Response::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        out
    }

    /// The failure path: 500, the error's string form, CORS re-asserted.
    fn failure<E: fmt::Display + ?Sized>(&self, err: &E) -> Response<Body> {
        tracing::error!(error = %err, "request failed in the gateway");
        let mut response = Response::new(Body::from(err.to_string()));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        self.apply_cors(response.headers_mut());
        response
    }

    fn apply_cors(&self, headers: &mut HeaderMap) {
        if let Ok(origin) = HeaderValue::from_str(&self.config.client_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

impl Service<Request<Body>> for Gateway {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let gateway = self.clone();
        Box::pin(async move { Ok(gateway.handle(request).await) })
    }
}
