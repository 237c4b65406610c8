//! Disk path helpers
//!
//! Disk paths are absolute, slash-separated and may carry a `disk:` or
//! `app:` scheme. Folder names typed by users on Windows often use
//! backslashes and miss the leading or trailing slash.

use std::path::Path;

use crate::error::{Error, Result};

const SCHEMES: [&str; 2] = ["disk:", "app:"];

/// Normalize a destination folder to `/a/b/` form
///
/// Backslashes become slashes and the leading and trailing slashes are
/// added when missing. An empty folder is the disk root `/`.
pub fn normalize_folder(folder: &str) -> String {
    let folder = folder.replace('\\', "/");
    let (scheme, rest) = split_scheme(&folder);

    let mut normalized = String::with_capacity(rest.len() + 2);
    normalized.push_str(scheme);
    if !rest.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(rest);
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Destination of a local file uploaded into `folder`
pub fn file_destination(folder: &str, local_path: &Path) -> Result<String> {
    let file_name = local_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::InvalidPath(local_path.display().to_string()))?;

    Ok(format!("{}{}", normalize_folder(folder), file_name))
}

fn split_scheme(path: &str) -> (&str, &str) {
    for scheme in SCHEMES {
        if let Some(rest) = path.strip_prefix(scheme) {
            return (scheme, rest);
        }
    }
    ("", path)
}
