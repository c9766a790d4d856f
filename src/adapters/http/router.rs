//! Thin application router for the REST surface.
//!
//! Implements the buffered `RequestHandler` contract by dispatching on
//! method and path segments, calling the store (and, for message posts, the
//! relay) directly. Per-call failures collapse into the fixed
//! `{"error": "Internal server error"}` payload; the real error is only
//! logged server-side.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::StatusCode;

use crate::adapters::websocket::Relay;
use crate::ports::{
    ApiRequest, ApiResponse, ByteStream, ChatStore, HandlerError, RequestHandler,
};

use super::dto::{
    CreateRoomRequest, ErrorResponse, MessageResponse, PostMessageRequest, RoomResponse,
    SuccessResponse,
};

/// Maps REST operations onto the store and the relay.
pub struct ApiRouter {
    store: Arc<dyn ChatStore>,
    relay: Arc<Relay>,
}

impl ApiRouter {
    /// Creates a router over the given store and relay.
    pub fn new(store: Arc<dyn ChatStore>, relay: Arc<Relay>) -> Self {
        Self { store, relay }
    }

    /// Drain a request body stream into memory.
    async fn read_body(body: Option<ByteStream>) -> Result<Bytes, HandlerError> {
        let Some(mut stream) = body else {
            return Ok(Bytes::new());
        };
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| HandlerError::Body(err.to_string()))?;
            buffer.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(buffer))
    }

    fn internal_error() -> ApiResponse {
        ApiResponse::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            &ErrorResponse::internal(),
        )
    }

    async fn create_room(&self, body: Option<ByteStream>) -> Result<ApiResponse, HandlerError> {
        let bytes = Self::read_body(body).await?;
        let request: CreateRoomRequest = match serde_json::from_slice(&bytes) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(error = %err, "malformed create-room body");
                return Ok(Self::internal_error());
            }
        };

        match self.store.create_room(&request.name).await {
            Ok(room) => Ok(ApiResponse::json(
                StatusCode::OK,
                &RoomResponse::from(room),
            )),
            Err(err) => {
                tracing::error!(error = %err, "failed to create room");
                Ok(Self::internal_error())
            }
        }
    }

    async fn list_rooms(&self) -> Result<ApiResponse, HandlerError> {
        match self.store.list_rooms().await {
            Ok(rooms) => {
                let rooms: Vec<RoomResponse> =
                    rooms.into_iter().map(RoomResponse::from).collect();
                Ok(ApiResponse::json(StatusCode::OK, &rooms))
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to list rooms");
                Ok(Self::internal_error())
            }
        }
    }

    async fn list_messages(&self, room_id: &str) -> Result<ApiResponse, HandlerError> {
        match self.store.list_messages(room_id).await {
            Ok(messages) => {
                let messages: Vec<MessageResponse> =
                    messages.into_iter().map(MessageResponse::from).collect();
                Ok(ApiResponse::json(StatusCode::OK, &messages))
            }
            Err(err) => {
                tracing::error!(%room_id, error = %err, "failed to list messages");
                Ok(Self::internal_error())
            }
        }
    }

    async fn post_message(
        &self,
        room_id: &str,
        body: Option<ByteStream>,
    ) -> Result<ApiResponse, HandlerError> {
        let bytes = Self::read_body(body).await?;
        let request: PostMessageRequest = match serde_json::from_slice(&bytes) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(%room_id, error = %err, "malformed message body");
                return Ok(Self::internal_error());
            }
        };

        // Broadcast now; persistence is the relay's detached concern. The
        // acknowledgement does not depend on the write landing.
        self.relay.broadcast(room_id, request.into_draft(room_id)).await;
        Ok(ApiResponse::json(StatusCode::OK, &SuccessResponse::ok()))
    }
}

#[async_trait]
impl RequestHandler for ApiRouter {
    async fn handle(&self, request: ApiRequest) -> Result<ApiResponse, HandlerError> {
        let path = request.url.path().to_string();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", []) => Ok(ApiResponse::text(StatusCode::OK, "Server is running")),
            ("POST", ["api", "rooms"]) => self.create_room(request.body).await,
            ("GET", ["api", "rooms"]) => self.list_rooms().await,
            ("GET", ["api", "rooms", room_id, "messages"]) => {
                self.list_messages(room_id).await
            }
            ("POST", ["api", "rooms", room_id, "messages"]) => {
                self.post_message(room_id, request.body).await
            }
            _ => Ok(ApiResponse::text(StatusCode::NOT_FOUND, "Not Found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChatStore;
    use crate::adapters::websocket::RoomRegistry;
    use crate::domain::{Message, MessageDraft, Room};
    use crate::ports::{ApiBody, StoreError};
    use std::collections::HashMap;

    struct FailingStore;

    #[async_trait]
    impl ChatStore for FailingStore {
        async fn create_room(&self, _name: &str) -> Result<Room, StoreError> {
            Err(StoreError::Database("down".to_string()))
        }

        async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
            Err(StoreError::Database("down".to_string()))
        }

        async fn create_message(&self, _draft: MessageDraft) -> Result<(), StoreError> {
            Err(StoreError::Database("down".to_string()))
        }

        async fn list_messages(&self, _room_id: &str) -> Result<Vec<Message>, StoreError> {
            Err(StoreError::Database("down".to_string()))
        }
    }

    fn router_over(store: Arc<dyn ChatStore>) -> ApiRouter {
        let registry = Arc::new(RoomRegistry::new());
        let relay = Arc::new(Relay::new(registry, store.clone()));
        ApiRouter::new(store, relay)
    }

    fn api_request(method: &str, path: &str, body: Option<&str>) -> ApiRequest {
        let body = body.map(|content| {
            let bytes = Bytes::copy_from_slice(content.as_bytes());
            let stream: ByteStream = Box::pin(futures::stream::iter(vec![Ok(bytes)]));
            stream
        });
        ApiRequest {
            method: method.parse().unwrap(),
            url: format!("http://localhost:5001{path}").parse().unwrap(),
            headers: HashMap::new(),
            body,
        }
    }

    fn body_json(response: ApiResponse) -> serde_json::Value {
        let ApiBody::Full(bytes) = response.body else {
            panic!("expected full body");
        };
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn liveness_route_returns_plaintext() {
        let router = router_over(Arc::new(InMemoryChatStore::new()));
        let response = router.handle(api_request("GET", "/", None)).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        let ApiBody::Full(bytes) = response.body else {
            panic!("expected full body");
        };
        assert_eq!(&bytes[..], b"Server is running");
    }

    #[tokio::test]
    async fn rooms_can_be_created_and_listed() {
        let router = router_over(Arc::new(InMemoryChatStore::new()));

        let created = router
            .handle(api_request("POST", "/api/rooms", Some(r#"{"name":"general"}"#)))
            .await
            .unwrap();
        assert_eq!(created.status, StatusCode::OK);
        let created = body_json(created);
        assert_eq!(created["name"], "general");
        assert!(created["id"].is_string());

        let listed = router
            .handle(api_request("GET", "/api/rooms", None))
            .await
            .unwrap();
        let listed = body_json(listed);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["name"], "general");
    }

    #[tokio::test]
    async fn post_message_acknowledges_immediately() {
        let router = router_over(Arc::new(InMemoryChatStore::new()));

        let response = router
            .handle(api_request(
                "POST",
                "/api/rooms/r1/messages",
                Some(r#"{"messageType":"text","text":"hi","userId":"u1","userName":"Alice","avatar":"a.png"}"#),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body_json(response), serde_json::json!({"success": true}));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let router = router_over(Arc::new(InMemoryChatStore::new()));
        let response = router
            .handle(api_request("GET", "/api/unknown", None))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn storage_failure_collapses_into_the_generic_payload() {
        let router = router_over(Arc::new(FailingStore));
        let response = router
            .handle(api_request("POST", "/api/rooms", Some(r#"{"name":"general"}"#)))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response),
            serde_json::json!({"error": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn malformed_json_takes_the_same_generic_path() {
        let router = router_over(Arc::new(InMemoryChatStore::new()));
        let response = router
            .handle(api_request("POST", "/api/rooms", Some("{not json")))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response),
            serde_json::json!({"error": "Internal server error"})
        );
    }
}
