//! # Cache Paths
//!
//! Maps resource URLs onto the on-disk cache layout
//! `{root}/{scheme}/{host}[/P{port}]/{url-path}`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use url::Url;

use crate::CacheError;

/// Prefix of the sidecar file holding an entry's entity tag
pub const ETAG_PREFIX: &str = ".etag.";

/// Prefix of the temporary file a body is streamed into
pub const PARTIAL_PREFIX: &str = ".part.";

/// Directory mode for created cache directories
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), CacheError> {
        create_dir_all(&self.root).await
    }

    /// Compute the cache path of `url`, without touching the filesystem
    pub fn to_path(&self, url: &Url) -> PathBuf {
        let mut path = self.root.join(url.scheme());

        if let Some(host) = url.host_str() {
            path.push(host);
        }
        // `host:port` would not be a portable path segment
        if let Some(port) = url.port() {
            path.push(format!("P{port}"));
        }

        for segment in url.path().split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }

        path
    }

    /// Compute the cache path of `url` and create its parent directories
    pub async fn ensure_path(&self, url: &Url) -> Result<PathBuf, CacheError> {
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        if file_name.is_empty() {
            return Err(CacheError::InvalidUrl(format!(
                "{url} does not name a file"
            )));
        }
        if is_metadata_name(file_name) {
            return Err(CacheError::InvalidUrl(format!(
                "{url} collides with cache metadata naming"
            )));
        }

        let path = self.to_path(url);
        let parent = path
            .parent()
            .ok_or_else(|| CacheError::InvalidPath(path.clone()))?;

        create_dir_all(parent).await?;
        debug!(url = %url, path = %path.display(), "Ensured cache path");

        Ok(path)
    }

    /// List every cached resource under the root, skipping metadata files
    pub async fn entries(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut entries = Vec::new();

        if !fs::try_exists(&self.root).await? {
            return Ok(entries);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if !is_metadata_file(&path) {
                    entries.push(path);
                }
            }
        }

        entries.sort();
        Ok(entries)
    }
}

/// Whether `path` is one of the cache's own bookkeeping files
pub fn is_metadata_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(is_metadata_name)
}

fn is_metadata_name(name: &str) -> bool {
    name.starts_with(ETAG_PREFIX) || name.starts_with(PARTIAL_PREFIX)
}

/// Path of the entity tag sidecar of `path`
pub fn etag_path(path: &Path) -> Result<PathBuf, CacheError> {
    prefixed_sibling(path, ETAG_PREFIX)
}

/// Path a body for `path` is streamed into before it is renamed into place
pub fn partial_path(path: &Path) -> Result<PathBuf, CacheError> {
    prefixed_sibling(path, PARTIAL_PREFIX)
}

fn prefixed_sibling(path: &Path, prefix: &str) -> Result<PathBuf, CacheError> {
    let name = path
        .file_name()
        .ok_or_else(|| CacheError::InvalidPath(path.to_path_buf()))?;

    let mut sibling = std::ffi::OsString::from(prefix);
    sibling.push(name);
    Ok(path.with_file_name(sibling))
}

async fn create_dir_all(dir: &Path) -> Result<(), CacheError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    builder
        .create(dir)
        .await
        .map_err(|source| CacheError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}
