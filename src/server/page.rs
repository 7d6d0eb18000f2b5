//! HTML rendering of directory pages

use maud::{DOCTYPE, Markup, html};

use crate::index::IndexResult;
use crate::navigate::Breadcrumb;

/// Everything a directory page shows
pub struct DirectoryPage<'a> {
    pub current_url: &'a str,
    pub parent_url: Option<String>,
    /// Directory path relative to the media root, posted back on upload
    pub fs_rel_path: &'a str,
    pub search: Option<&'a str>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub listing: &'a IndexResult,
}

impl DirectoryPage<'_> {
    pub fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { "RAX Media - " (self.current_url) }
                    link rel="stylesheet" href="/static/style.css";
                }
                body {
                    nav class="breadcrumbs" {
                        @for crumb in &self.breadcrumbs {
                            @if crumb.is_last {
                                span { (crumb.label) }
                            } @else {
                                a href=(crumb.url) { (crumb.label) } " / "
                            }
                        }
                    }
                    form method="get" action=(self.current_url) {
                        input type="search" name="search" value=(self.search.unwrap_or(""))
                            placeholder="Search files";
                        button type="submit" { "Search" }
                    }
                    form method="post" action="/upload" enctype="multipart/form-data" {
                        input type="hidden" name="path" value=(self.fs_rel_path);
                        input type="hidden" name="current_url" value=(self.current_url);
                        input type="file" name="file" required;
                        button type="submit" { "Upload" }
                    }
                    table class="entries" {
                        thead {
                            tr { th { "Name" } th { "Modified" } th { "Size" } th {} }
                        }
                        tbody {
                            @if let Some(parent) = &self.parent_url {
                                tr { td { a href=(parent) { ".." } } td {} td {} td {} }
                            }
                            @for entry in &self.listing.entries {
                                tr {
                                    td {
                                        a href=(entry.relative_url) {
                                            (entry.name) @if entry.is_dir { "/" }
                                        }
                                    }
                                    td { (entry.modified_display()) }
                                    td { @if !entry.is_dir { (entry.human_size()) } }
                                    td { a href=(entry.download_url) { "Download" } }
                                }
                            }
                        }
                    }
                    @if !self.listing.skipped.is_empty() {
                        p class="skipped" {
                            (self.listing.skipped.len()) " entries could not be read"
                        }
                    }
                }
            }
        }
    }
}
