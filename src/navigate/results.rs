//! Result types for navigate operations

/// One step of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub url: String,
    pub is_last: bool,
}
