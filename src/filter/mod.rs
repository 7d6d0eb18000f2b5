//! Path exclusion
//!
//! Hides configured path segments from listings and search results.

mod ignore;

pub use ignore::{IgnoreFilter, should_ignore};
