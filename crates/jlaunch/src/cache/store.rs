//! # Revalidation Store
//!
//! Persists the validators of each cache entry between runs. The default
//! [`SidecarStore`] keeps the timestamp as the file's own modification time
//! and the entity tag in a `.etag.` sidecar next to it.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use filetime::FileTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::CacheError;
use crate::cache::paths::etag_path;
use crate::cache::types::Validators;
use crate::cache::utils::{format_http_date, parse_http_date};

/// Storage for per-entry revalidation metadata
#[async_trait]
pub trait RevalidationStore: Send + Sync {
    /// HTTP-date of the entry at `path`, `None` if there is no entry yet
    async fn last_modified(&self, path: &Path) -> Result<Option<String>, CacheError>;

    /// Stored entity tag of the entry at `path`, `None` if none was recorded
    async fn etag(&self, path: &Path) -> Result<Option<String>, CacheError>;

    /// Apply freshly received validators; absent fields are left untouched
    async fn touch(&self, path: &Path, validators: &Validators) -> Result<(), CacheError>;

    /// Remove the entry and its metadata, missing files are not an error
    async fn remove(&self, path: &Path) -> Result<(), CacheError>;

    /// Both validators of the entry at `path`
    async fn validators(&self, path: &Path) -> Result<Validators, CacheError> {
        Ok(Validators {
            last_modified: self.last_modified(path).await?,
            etag: self.etag(path).await?,
        })
    }
}

/// Filesystem-backed store using mtimes and sidecar files
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarStore;

impl SidecarStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RevalidationStore for SidecarStore {
    async fn last_modified(&self, path: &Path) -> Result<Option<String>, CacheError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(format_http_date(metadata.modified()?)))
    }

    async fn etag(&self, path: &Path) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(etag_path(path)?).await {
            Ok(etag) => Ok(Some(etag)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn touch(&self, path: &Path, validators: &Validators) -> Result<(), CacheError> {
        if let Some(last_modified) = &validators.last_modified {
            let mtime = parse_http_date(last_modified)?;
            let time = FileTime::from_unix_time(mtime.timestamp(), 0);
            filetime::set_file_times(path, time, time)?;
            debug!(path = %path.display(), last_modified = %last_modified, "Set modification time");
        }

        if let Some(etag) = &validators.etag {
            let mut file = fs::File::create(etag_path(path)?).await?;
            file.write_all(etag.as_bytes()).await?;
            file.sync_all().await?;
            debug!(path = %path.display(), etag = %etag, "Stored entity tag");
        }

        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<(), CacheError> {
        for target in [path.to_path_buf(), etag_path(path)?] {
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
