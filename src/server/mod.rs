//! HTTP server
//!
//! Router, shared state, request handlers and page rendering.

pub mod core;
pub mod handlers;
pub mod page;
pub mod state;

pub use core::{Server, build_router};
pub use state::{AppState, SharedState};
