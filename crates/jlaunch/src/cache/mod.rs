//! # Cache System
//!
//! On-disk layout of cached resources and the metadata needed to
//! revalidate them against their origin.

mod paths;
mod store;
mod types;
mod utils;

pub use paths::{
    CachePaths, ETAG_PREFIX, PARTIAL_PREFIX, etag_path, is_metadata_file, partial_path,
};
pub use store::{RevalidationStore, SidecarStore};
pub use types::{DownloadKind, FetchOutcome, FetchResult, Resource, Validators};
pub use utils::{extract_validators, format_http_date, parse_http_date};
