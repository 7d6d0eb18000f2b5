//! RAX Media Server
//!
//! Serves a local directory tree over HTTP: browsing with sorted listings,
//! recursive name search, file and folder (zip) downloads, and uploads.

pub mod archive;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod middleware;
pub mod navigate;
pub mod server;
pub mod settings;
pub mod storage;

pub use server::Server;
