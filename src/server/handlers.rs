//! Request handlers
//!
//! Thin adapters between axum extractors and the media core. Filesystem
//! work runs on the blocking pool.

use axum::body::Body;
use axum::extract::{Multipart, Query, RawQuery, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;

use crate::archive::build_archive;
use crate::error::MediaError;
use crate::index::{DirectoryIndexer, IndexResult};
use crate::navigate::{breadcrumbs, parent_url};
use crate::server::page::DirectoryPage;
use crate::server::state::SharedState;
use crate::storage::{EntryKind, Escaping, entry_kind, store_upload};

const MEDIA_PREFIX: &str = "/media";

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    search: Option<String>,
}

/// What a resolved media path turned out to be
enum MediaView {
    File { path: PathBuf },
    Listing { rel_path: String, listing: IndexResult },
}

/// What a download request produces
enum Download {
    File(PathBuf),
    Archive(Vec<u8>),
}

async fn run_blocking<T, F>(work: F) -> Result<T, MediaError>
where
    F: FnOnce() -> Result<T, MediaError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MediaError::Io(std::io::Error::other(e)))?
}

/// Streams a regular file, optionally as a named attachment.
async fn file_response(path: &Path, attachment: Option<&str>) -> Result<Response, MediaError> {
    let display = path.display().to_string();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| MediaError::from_io(&display, e))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| MediaError::from_io(&display, e))?
        .len();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::with_capacity(file, 1 << 16));

    let mut response = (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        body,
    )
        .into_response();
    if let Some(name) = attachment {
        if let Ok(value) = attachment_header(name).parse() {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }
    Ok(response)
}

fn attachment_header(name: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", urlencoding::encode(name))
}

pub async fn handle_root() -> Redirect {
    Redirect::permanent("/media/")
}

pub async fn handle_favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Browses `/media/<path>`: directories render a listing, files are served raw.
///
/// Mounted as the router fallback so `/media`, `/media/` and every nested
/// path share one handler.
pub async fn handle_media(
    State(state): State<SharedState>,
    uri: Uri,
    Query(query): Query<BrowseQuery>,
) -> Result<Response, MediaError> {
    let url_path = uri.path().to_string();
    let Some(rest) = url_path.strip_prefix(MEDIA_PREFIX) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let requested = if rest.is_empty() { "/" } else { rest };
    let (codec, filter) = state.snapshot();
    let abs_path = state
        .resolver
        .resolve_encoded(requested, Escaping::Path, &codec)?;

    let search = query.search.filter(|s| !s.is_empty());
    let worker_state = state.clone();
    let worker_search = search.clone();

    let view = run_blocking(move || {
        let display = abs_path.display().to_string();
        match entry_kind(&abs_path).map_err(|e| MediaError::from_io(&display, e))? {
            EntryKind::File => Ok(MediaView::File { path: abs_path }),
            EntryKind::Directory => {
                let indexer = DirectoryIndexer::new(&worker_state.resolver, &codec, &filter);
                let listing = match &worker_search {
                    Some(search) => indexer.search(&abs_path, search)?,
                    None => indexer.list(&abs_path)?,
                };
                let rel_path = worker_state
                    .resolver
                    .relative_to_root(&abs_path)
                    .unwrap_or_default();
                Ok(MediaView::Listing { rel_path, listing })
            }
        }
    })
    .await?;

    match view {
        MediaView::File { path } => file_response(&path, None).await,
        MediaView::Listing { rel_path, listing } => {
            let current_url = url_path.trim_end_matches('/');
            let page = DirectoryPage {
                current_url,
                parent_url: parent_url(&url_path),
                fs_rel_path: &rel_path,
                search: search.as_deref(),
                breadcrumbs: breadcrumbs(&url_path),
                listing: &listing,
            };
            Ok(Html(page.render().into_string()).into_response())
        }
    }
}

/// Downloads `?path=<escaped>`: files as attachments, directories as zip.
///
/// The raw query is used so the path is unescaped exactly once, by the resolver.
pub async fn handle_download(
    State(state): State<SharedState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, MediaError> {
    let raw_path = raw_query
        .as_deref()
        .and_then(|q| q.split('&').find_map(|pair| pair.strip_prefix("path=")))
        .ok_or_else(|| MediaError::InvalidPath("Missing \"path\" parameter".into()))?;

    let (codec, _) = state.snapshot();
    let abs_path = state
        .resolver
        .resolve_encoded(raw_path, Escaping::Query, &codec)?;

    let name = abs_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "media".to_string());

    let download = run_blocking(move || {
        let display = abs_path.display().to_string();
        match entry_kind(&abs_path).map_err(|e| MediaError::from_io(&display, e))? {
            EntryKind::File => Ok(Download::File(abs_path)),
            EntryKind::Directory => build_archive(&abs_path).map(Download::Archive),
        }
    })
    .await?;

    match download {
        Download::Archive(contents) => {
            let archive_name = format!("{}.zip", name);
            info!("Sending archive {} ({} bytes)", archive_name, contents.len());
            Ok((
                [
                    (header::CONTENT_TYPE, "application/zip".to_string()),
                    (header::CONTENT_DISPOSITION, attachment_header(&archive_name)),
                ],
                contents,
            )
                .into_response())
        }
        Download::File(path) => file_response(&path, Some(&name)).await,
    }
}

/// Stores a multipart upload (`file`, `path`, `current_url`) and redirects back.
pub async fn handle_upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Response, MediaError> {
    let mut directory = String::new();
    let mut current_url = String::new();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MediaError::InvalidPath(format!("Error parsing multipart request: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    MediaError::InvalidPath(format!("Error reading multipart file: {}", e))
                })?;
                upload = Some((filename, bytes.to_vec()));
            }
            "path" | "current_url" => {
                let value = field.text().await.map_err(|e| {
                    MediaError::InvalidPath(format!("Error reading field {}: {}", field_name, e))
                })?;
                if field_name == "path" {
                    directory = value;
                } else {
                    current_url = value;
                }
            }
            other => warn!("Ignoring unexpected upload field \"{}\"", other),
        }
    }

    let (filename, contents) =
        upload.ok_or_else(|| MediaError::InvalidPath("Missing \"file\" field".into()))?;

    let worker_state = state.clone();
    run_blocking(move || {
        store_upload(&worker_state.resolver, &directory, &filename, &contents)
    })
    .await?;

    let is_media_url = current_url.starts_with(MEDIA_PREFIX)
        && !current_url.chars().any(|c| c == '\\' || c.is_control());
    let target = if is_media_url {
        current_url.as_str()
    } else {
        "/media/"
    };
    Ok(Redirect::to(target).into_response())
}
