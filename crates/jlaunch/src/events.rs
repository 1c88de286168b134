use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

/// Progress of a resolution, emitted once per step per resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveEvent {
    /// Deferred resource, left out of the cache
    Skipped { url: Url },
    /// Revalidation request about to be sent
    Fetching { url: Url, path: PathBuf },
    /// Fresh content was written
    Updated { url: Url, path: PathBuf, bytes: u64 },
    /// Cached copy confirmed by the origin
    NotModified { url: Url, path: PathBuf },
}

/// A callback for resolution progress.
pub type OnResolveEvent = Arc<dyn Fn(ResolveEvent) + Send + Sync>;
