//! REST API: the thin application router and its DTOs.

pub mod dto;
pub mod router;

pub use router::ApiRouter;
