//! Request-path to filesystem-path resolution.
//!
//! The raw request path is percent-decoded exactly once and then joined onto
//! the served root with [`safe_join`], which collapses `.`/`..` segments
//! lexically. The joined path can never leave the root: `..` only pops
//! components that were pushed by the same request, and absolute components
//! are ignored.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use crate::error::AppError;

/// A resolved request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Absolute filesystem path under the served root.
    pub fs_path: PathBuf,
    /// The decoded request path, used for display and link generation.
    pub request_path: String,
}

/// Percent-decode a raw request path and resolve it under `root`.
///
/// Decode failures (invalid UTF-8 in the decoded bytes) are rejected rather
/// than served literally.
pub fn resolve(root: &Path, raw_path: &str) -> Result<Resolved, AppError> {
    let decoded: Cow<'_, str> =
        urlencoding::decode(raw_path).map_err(|err| AppError::Decode(err.to_string()))?;

    let fs_path = safe_join(root, &decoded);

    Ok(Resolved {
        fs_path,
        request_path: decoded.into_owned(),
    })
}

/// Join a decoded request path onto `root` without allowing escapes.
///
/// `..` pops at most what the request itself pushed, `.` is dropped, and
/// root/prefix components are ignored, so the result always stays lexically
/// within `root`.
pub fn safe_join(root: &Path, request_path: &str) -> PathBuf {
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(request_path).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::ParentDir => {
                if depth > 0 {
                    joined.pop();
                    depth -= 1;
                }
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    joined
}
