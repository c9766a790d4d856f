//! Ports: async contracts between the core and its adapters.

mod chat_store;
mod request_handler;

pub use chat_store::{ChatStore, StoreError};
pub use request_handler::{
    ApiBody, ApiRequest, ApiResponse, BoxError, ByteStream, HandlerError, RequestHandler,
};
