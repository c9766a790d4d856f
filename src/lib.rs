//! Chat Relay - room-based real-time message broadcast with durable history.
//!
//! Clients join named rooms over a WebSocket channel, messages fan out to all
//! room members in-memory, and a detached task records each message for later
//! retrieval through the REST API.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
