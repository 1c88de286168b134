//! # Cache Types
//!
//! Types shared by the path mapper, the revalidation store and the fetcher.

use url::Url;

/// How eagerly the descriptor wants a resource fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadKind {
    /// Fetched before launch
    #[default]
    Eager,
    /// Fetched before launch; the descriptor allows progress reporting
    Progress,
    /// Fetched only when actually needed; never touched by the cache
    Lazy,
}

/// A remote resource the application needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: Url,
    /// Whether this resource holds the main class
    pub main: bool,
    pub download: DownloadKind,
}

impl Resource {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            main: false,
            download: DownloadKind::Eager,
        }
    }

    pub fn with_main(mut self, main: bool) -> Self {
        self.main = main;
        self
    }

    pub fn with_download(mut self, download: DownloadKind) -> Self {
        self.download = download;
        self
    }

    pub fn is_deferred(&self) -> bool {
        self.download == DownloadKind::Lazy
    }
}

/// Revalidation metadata of one cache entry
///
/// Both fields are optional and independent of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    /// HTTP-date, sent back as `If-Modified-Since`
    pub last_modified: Option<String>,
    /// Opaque entity tag, sent back as `If-None-Match`
    pub etag: Option<String>,
}

impl Validators {
    pub fn new(last_modified: Option<String>, etag: Option<String>) -> Self {
        Self {
            last_modified,
            etag,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_modified.is_none() && self.etag.is_none()
    }
}

/// What a conditional fetch did to the cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fresh content was written
    Updated { bytes: u64 },
    /// The origin confirmed the cached copy; nothing was written
    NotModified,
}

/// Result of a successful conditional fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub outcome: FetchOutcome,
    /// Validators for the caller to persist; empty on `NotModified`
    pub validators: Validators,
}

impl FetchResult {
    pub fn updated(bytes: u64, validators: Validators) -> Self {
        Self {
            outcome: FetchOutcome::Updated { bytes },
            validators,
        }
    }

    pub fn not_modified() -> Self {
        Self {
            outcome: FetchOutcome::NotModified,
            validators: Validators::default(),
        }
    }
}
