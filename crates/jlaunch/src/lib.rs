//! # jlaunch engine
//!
//! Local cache for the remote resources (jars) of a Java application.
//! Each resource is mapped to a stable path under a cache root and
//! revalidated against its origin with conditional GETs, so repeat launches
//! only transfer what actually changed.
//!
//! ## Features
//!
//! - Deterministic URL to path mapping, ports included
//! - `If-Modified-Since` / `If-None-Match` revalidation
//! - Validators persisted as file mtime plus an entity tag sidecar
//! - Atomic replacement of cache entries
//! - Pluggable transport and metadata store

pub mod builder;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod proxy;
pub mod resolver;
pub mod transport;

pub use builder::FetchConfigBuilder;
pub use cache::{
    CachePaths, DownloadKind, FetchOutcome, FetchResult, Resource, RevalidationStore,
    SidecarStore, Validators,
};
pub use client::create_client;
pub use config::{CacheConfig, FetchConfig};
pub use error::CacheError;
pub use events::{OnResolveEvent, ResolveEvent};
pub use fetcher::ConditionalFetcher;
pub use proxy::{ProxyAuth, ProxyConfig};
pub use resolver::CacheResolver;
pub use transport::{BodyStream, HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
