//! Path validation
//!
//! Translates untrusted, percent-escaped request paths into absolute paths
//! inside the media root.

use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::codec::NameCodec;
use crate::error::MediaError;

/// How the raw input was escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaping {
    /// Query-string value: `+` means space
    Query,
    /// URL path: `+` is literal
    Path,
}

/// Whether resolved paths may lead outside the media root through symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Leave symlinks to the host filesystem
    #[default]
    Follow,
    /// Reject existing paths whose canonical form leaves the media root
    Contain,
}

/// Resolves request paths against the media root
#[derive(Debug, Clone)]
pub struct PathResolver {
    media_root: PathBuf,
    symlink_policy: SymlinkPolicy,
}

impl PathResolver {
    /// `media_root` is made absolute and canonicalized.
    pub fn new(media_root: &Path, symlink_policy: SymlinkPolicy) -> std::io::Result<Self> {
        let media_root = std::path::absolute(media_root)?.canonicalize()?;
        Ok(Self {
            media_root,
            symlink_policy,
        })
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Unescapes and validates `raw`, returning an absolute path under the media root.
    pub fn resolve(&self, raw: &str, escaping: Escaping) -> Result<PathBuf, MediaError> {
        let unescaped = unescape(raw, escaping)?;
        self.resolve_relative(&unescaped)
    }

    /// Like [`PathResolver::resolve`], but a final segment carrying the codec
    /// marker is decoded back to the real file name before validation.
    pub fn resolve_encoded(
        &self,
        raw: &str,
        escaping: Escaping,
        codec: &NameCodec,
    ) -> Result<PathBuf, MediaError> {
        let unescaped = unescape(raw, escaping)?;
        let decoded = decode_final_segment(&unescaped, codec)?;
        self.resolve_relative(&decoded)
    }

    /// Validates an already unescaped path relative to the media root.
    pub fn resolve_relative(&self, relative: &str) -> Result<PathBuf, MediaError> {
        if relative.is_empty() {
            return Err(MediaError::InvalidPath("Empty path".into()));
        }
        if relative.contains('\0') {
            return Err(MediaError::InvalidPath("Path contains NUL byte".into()));
        }

        let segments = normalize_segments(relative)
            .ok_or_else(|| MediaError::InvalidPath(relative.to_string()))?;

        let mut resolved = self.media_root.clone();
        resolved.extend(segments);

        if self.symlink_policy == SymlinkPolicy::Contain {
            self.check_symlink_containment(&resolved, relative)?;
        }

        Ok(resolved)
    }

    /// Path of `absolute` relative to the media root, `/`-separated.
    pub fn relative_to_root(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.media_root).ok()?;
        Some(to_url_path(relative))
    }

    fn check_symlink_containment(&self, resolved: &Path, relative: &str) -> Result<(), MediaError> {
        // A path that does not exist yet (an upload target) is judged by its
        // nearest existing ancestor. A dangling symlink has no such answer.
        let canonical = match resolved.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) if resolved.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) => {
                warn!("Dangling symlink rejected: {}", resolved.display());
                return Err(MediaError::InvalidPath(relative.to_string()));
            }
            Err(_) => match resolved.ancestors().skip(1).find_map(|a| a.canonicalize().ok()) {
                Some(canonical) => canonical,
                None => return Ok(()),
            },
        };

        if canonical.starts_with(&self.media_root) {
            Ok(())
        } else {
            warn!(
                "Symlink escape rejected: {} -> {}",
                resolved.display(),
                canonical.display()
            );
            Err(MediaError::InvalidPath(relative.to_string()))
        }
    }
}

/// Resolves `.` and `..` purely lexically.
///
/// Returns `None` when a `..` would climb above the starting directory.
pub fn normalize_segments(relative: &str) -> Option<Vec<&str>> {
    let mut stack = Vec::new();

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            other => stack.push(other),
        }
    }

    Some(stack)
}

/// Replaces the final segment with its decoded name if it carries the codec marker.
pub fn decode_final_segment(path: &str, codec: &NameCodec) -> Result<String, MediaError> {
    let (parent, name) = match path.rfind('/') {
        Some(idx) => (Some(&path[..idx]), &path[idx + 1..]),
        None => (None, path),
    };

    if !codec.has_prefix(name) {
        return Ok(path.to_string());
    }

    let decoded = codec.decode(name)?;
    Ok(match parent {
        Some(parent) => format!("{}/{}", parent, decoded),
        None => decoded,
    })
}

/// Percent-decodes `raw`, rejecting malformed escapes and invalid UTF-8.
pub fn unescape(raw: &str, escaping: Escaping) -> Result<String, MediaError> {
    let bytes = raw.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(MediaError::InvalidPath(format!(
                    "Malformed escape sequence in \"{}\"",
                    raw
                )));
            }
        }
    }

    let spaced;
    let input = match escaping {
        Escaping::Query => {
            spaced = raw.replace('+', " ");
            spaced.as_str()
        }
        Escaping::Path => raw,
    };

    urlencoding::decode(input)
        .map(|s| s.into_owned())
        .map_err(|e| MediaError::InvalidPath(format!("\"{}\": {}", raw, e)))
}

/// Joins path components with `/` regardless of platform.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
