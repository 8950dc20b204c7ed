//! Directory listing construction.
//!
//! Enumerates a directory into the view-model handed to the template
//! renderer: one entry per child (never the directory itself), a parent
//! link computed in URL space, and the localized text block. Directory
//! entries display with a trailing `/` and always report size 0; only file
//! sizes are meaningful.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{LocaleText, INDEX_FILES, SERVER_VERSION};
use crate::error::AppError;

/// A single row in the rendered listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    /// Display name; directories carry a trailing `/`.
    pub name: String,
    pub is_dir: bool,
    /// Last-modified time as an RFC 1123 HTTP date.
    pub last_modified: String,
    /// File size in bytes; 0 for directories.
    pub size: u64,
    /// Link target, percent-encoded and joined onto the request path.
    pub href: String,
}

/// View-model consumed by the listing template.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub entries: Vec<ListingEntry>,
    /// Parent directory link, stable at `/` for the root.
    pub parent: String,
    /// Decoded request path shown in the heading.
    pub request_path: String,
    pub version: &'static str,
    pub text: LocaleText,
}

/// Look for an index file inside `dir`, in [`INDEX_FILES`] order.
///
/// Returns the first candidate that exists and is a regular file.
pub async fn find_index(dir: &Path) -> Option<PathBuf> {
    for name in INDEX_FILES {
        let candidate = dir.join(name);
        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => return Some(candidate),
            _ => {}
        }
    }
    None
}

/// Enumerate `dir` into a [`Listing`].
///
/// `raw_path` is the still-encoded request path (ending in `/`) used for
/// link generation; `request_path` is its decoded form used for display.
/// Entries are sorted by name, case-insensitively. Children whose metadata
/// cannot be read are skipped and logged rather than failing the listing.
pub async fn build_listing(
    dir: &Path,
    raw_path: &str,
    request_path: String,
    text: LocaleText,
) -> Result<Listing, AppError> {
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(AppError::ReadDir)?;

    let mut entries = Vec::new();
    while let Some(child) = read_dir.next_entry().await.map_err(AppError::ReadDir)? {
        let file_name = child.file_name();
        let name = file_name.to_string_lossy().into_owned();

        let meta = match child.metadata().await {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!(entry = %name, error = %err, "Skipping unreadable directory entry");
                continue;
            }
        };

        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let is_dir = meta.is_dir();
        let href = join_href(raw_path, &name, is_dir);

        entries.push(ListingEntry {
            name: if is_dir { format!("{name}/") } else { name },
            is_dir,
            last_modified: format_http_date(modified),
            size: if is_dir { 0 } else { meta.len() },
            href,
        });
    }

    entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    Ok(Listing {
        entries,
        parent: parent_directory(raw_path),
        request_path,
        version: SERVER_VERSION,
        text,
    })
}

/// Build an entry link by appending the percent-encoded child name to the
/// encoded request path.
fn join_href(raw_path: &str, name: &str, is_dir: bool) -> String {
    let base = if raw_path.ends_with('/') {
        raw_path.to_string()
    } else {
        format!("{raw_path}/")
    };
    let encoded = urlencoding::encode(name);
    if is_dir {
        format!("{base}{encoded}/")
    } else {
        format!("{base}{encoded}")
    }
}

/// Resolve `..` against a request path ending in `/`.
///
/// Walks back one path segment; the root is its own parent. This is real
/// segment resolution, not string truncation, so `/a/` correctly yields `/`.
pub fn parent_directory(request_path: &str) -> String {
    let trimmed = request_path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Format a timestamp as an RFC 1123 HTTP date (`Tue, 05 Aug 2026 10:00:00 GMT`).
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use std::time::Duration;

    fn text() -> LocaleText {
        Locale::English.text()
    }

    #[tokio::test]
    async fn listing_has_one_entry_per_child() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"0123456789").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = build_listing(dir.path(), "/", "/".to_string(), text())
            .await
            .unwrap();

        assert_eq!(listing.entries.len(), 2);

        let file = &listing.entries[0];
        assert_eq!(file.name, "a.txt");
        assert!(!file.is_dir);
        assert_eq!(file.size, 10);
        assert_eq!(file.href, "/a.txt");

        let sub = &listing.entries[1];
        assert_eq!(sub.name, "sub/");
        assert!(sub.is_dir);
        assert_eq!(sub.size, 0);
        assert_eq!(sub.href, "/sub/");
    }

    #[tokio::test]
    async fn entries_sort_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Beta.txt", "alpha.txt", "Zed", "gamma.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let listing = build_listing(dir.path(), "/", "/".to_string(), text())
            .await
            .unwrap();

        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.txt", "Beta.txt", "gamma.txt", "Zed"]);
    }

    #[tokio::test]
    async fn hrefs_are_percent_encoded_under_the_request_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("some file.txt"), b"x").unwrap();

        let listing = build_listing(dir.path(), "/docs/", "/docs/".to_string(), text())
            .await
            .unwrap();

        assert_eq!(listing.entries[0].href, "/docs/some%20file.txt");
    }

    #[tokio::test]
    async fn modified_time_formats_as_rfc1123() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), b"x").unwrap();

        let listing = build_listing(dir.path(), "/", "/".to_string(), text())
            .await
            .unwrap();

        // e.g. "Tue, 05 Aug 2026 10:00:00 GMT"
        let date = &listing.entries[0].last_modified;
        assert!(date.ends_with(" GMT"), "unexpected date format: {date}");
        assert_eq!(date.split(' ').count(), 6);
    }

    #[tokio::test]
    async fn index_html_is_preferred_over_index_htm() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_index(dir.path()).await, None);

        std::fs::write(dir.path().join("index.htm"), b"htm").unwrap();
        assert_eq!(
            find_index(dir.path()).await,
            Some(dir.path().join("index.htm"))
        );

        std::fs::write(dir.path().join("index.html"), b"html").unwrap();
        assert_eq!(
            find_index(dir.path()).await,
            Some(dir.path().join("index.html"))
        );
    }

    #[tokio::test]
    async fn index_directory_does_not_short_circuit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("index.html")).unwrap();
        assert_eq!(find_index(dir.path()).await, None);
    }

    #[test]
    fn parent_resolves_one_segment_up() {
        assert_eq!(parent_directory("/a/b/"), "/a/");
        assert_eq!(parent_directory("/a/"), "/");
        assert_eq!(parent_directory("/"), "/");
    }

    #[test]
    fn http_date_is_stable() {
        let epoch_plus = SystemTime::UNIX_EPOCH + Duration::from_secs(86400);
        assert_eq!(format_http_date(epoch_plus), "Fri, 02 Jan 1970 00:00:00 GMT");
    }
}
