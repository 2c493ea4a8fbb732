// src/uri_utils.rs
//! Path helpers shared by the transfer and sync planners.

use std::path::{Path, PathBuf};

/// Split a `bucket/key` style path at the first `/`. A path with no slash
/// is all bucket, empty key (a bucket root or bare prefix). Unicode passes
/// through untouched.
pub fn find_bucket_key(s3_path: &str) -> (String, String) {
    match s3_path.split_once('/') {
        Some((bucket, key)) => (bucket.to_owned(), key.to_owned()),
        None => (s3_path.to_owned(), String::new()),
    }
}

/// Render `path` relative to `start` as `./tail`, for display alongside
/// remote paths. When no relative form exists (e.g. different roots), the
/// path is returned as given instead of failing.
pub fn relative_path(path: &Path, start: &Path) -> PathBuf {
    match path.strip_prefix(start) {
        Ok(tail) => PathBuf::from(".").join(tail),
        Err(_) => path.to_owned(),
    }
}
