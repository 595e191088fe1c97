//! Downloadable responses: detection, filename derivation and saving.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};

use crate::error::Result;

pub const DEFAULT_DOWNLOAD_NAME: &str = "download";

/// Content types saved as files instead of being decoded. Matched as substrings.
const DOWNLOADABLE_TYPES: [&str; 12] = [
    "image/",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/csv",
    "application/zip",
    "application/x-zip-compressed",
    "application/octet-stream",
];

static FILENAME_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename(\*)?\s*=\s*(?:"([^"]*)"|'([^']*)'|([^;\n]*))"#)
        .expect("Invalid regex")
});

/// A response body that was classified as a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Location written by the configured sink, if any
    pub saved_to: Option<PathBuf>,
}

/// Destination for downloaded files
pub trait DownloadSink: Send + Sync + 'static {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Saves downloads into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(sanitize_filename(filename));
        std::fs::write(&path, bytes)?;
        tracing::info!("Saved download to {}", path.display());
        Ok(path)
    }
}

pub fn is_downloadable(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    DOWNLOADABLE_TYPES
        .iter()
        .any(|candidate| content_type.contains(candidate))
}

/// Resolve the name a download is saved under: content-disposition first, then
/// the last request path segment, then [`DEFAULT_DOWNLOAD_NAME`].
pub fn resolve_filename(headers: &HeaderMap, request_path: &str) -> String {
    filename_from_headers(headers)
        .or_else(|| filename_from_path(request_path))
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

pub fn filename_from_headers(headers: &HeaderMap) -> Option<String> {
    let disposition = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    filename_from_disposition(disposition)
}

pub fn filename_from_disposition(disposition: &str) -> Option<String> {
    let captures = FILENAME_PARAM.captures(disposition)?;
    let extended = captures.get(1).is_some();
    let raw = captures
        .get(2)
        .or_else(|| captures.get(3))
        .or_else(|| captures.get(4))?
        .as_str()
        .trim();

    // RFC 5987 form: charset'language'encoded-name
    let raw = if extended {
        raw.splitn(3, '\'').nth(2).unwrap_or(raw)
    } else {
        raw
    };
    let raw = raw.replace(['"', '\''], "");
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    Some(
        urlencoding::decode(raw)
            .map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned),
    )
}

pub fn filename_from_path(request_path: &str) -> Option<String> {
    let path = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or(request_path);
    path.rsplit('/')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
}

fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|character| match character {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        DEFAULT_DOWNLOAD_NAME.to_string()
    } else {
        cleaned
    }
}
