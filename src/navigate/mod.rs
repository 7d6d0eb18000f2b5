//! Navigate module
//!
//! Derives breadcrumb trails and parent links from the browsed URL path.

mod operations;
mod results;

// Re-export public types and functions
pub use operations::{breadcrumbs, parent_url};
pub use results::Breadcrumb;
