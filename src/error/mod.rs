//! Error handling
//!
//! Defines error types and their HTTP mapping for the media server.

pub mod handlers;
pub mod types;

pub use handlers::error_to_status_code;
pub use types::*;
