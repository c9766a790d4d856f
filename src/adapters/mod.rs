//! Adapters binding the ports to concrete infrastructure.

pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
