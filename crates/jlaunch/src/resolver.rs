//! # Cache Resolver
//!
//! Brings every eager resource of a descriptor into the local cache, one
//! resource at a time, and reports where each one lives.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::cache::{CachePaths, FetchOutcome, Resource, RevalidationStore, SidecarStore, Validators};
use crate::client::create_client;
use crate::events::{OnResolveEvent, ResolveEvent};
use crate::fetcher::ConditionalFetcher;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{CacheConfig, CacheError, FetchConfig};

pub struct CacheResolver<T = ReqwestTransport, S = SidecarStore> {
    paths: CachePaths,
    fetcher: ConditionalFetcher<T>,
    store: S,
    on_event: Option<OnResolveEvent>,
}

impl CacheResolver {
    /// Resolver over a reqwest client built from `fetch_config`
    pub fn new(cache_config: CacheConfig, fetch_config: &FetchConfig) -> Result<Self, CacheError> {
        let client = create_client(fetch_config)?;
        let fetcher = ConditionalFetcher::new(ReqwestTransport::new(client))
            .with_retries(fetch_config.max_retries, fetch_config.retry_delay_base);

        Ok(Self::with_parts(cache_config, fetcher, SidecarStore::new()))
    }
}

impl<T, S> CacheResolver<T, S>
where
    T: HttpTransport,
    S: RevalidationStore,
{
    pub fn with_parts(cache_config: CacheConfig, fetcher: ConditionalFetcher<T>, store: S) -> Self {
        Self {
            paths: CachePaths::new(cache_config.root),
            fetcher,
            store,
            on_event: None,
        }
    }

    pub fn with_event_handler(mut self, on_event: OnResolveEvent) -> Self {
        self.on_event = Some(on_event);
        self
    }

    /// Resolve `resources` in order, stopping at the first failure
    ///
    /// The result has one entry per resource; deferred resources yield `None`.
    pub async fn resolve_all(
        &self,
        resources: &[Resource],
    ) -> Result<Vec<Option<PathBuf>>, CacheError> {
        self.paths.ensure_root().await?;
        let root = self.paths.root();

        info!(
            root = %root.display(),
            resources = resources.len(),
            "Resolving resources"
        );

        let mut resolved = Vec::with_capacity(resources.len());
        for resource in resources {
            resolved.push(self.resolve_one(resource).await?);
        }

        Ok(resolved)
    }

    /// One full revalidate-and-persist cycle for a single resource
    pub async fn resolve_one(&self, resource: &Resource) -> Result<Option<PathBuf>, CacheError> {
        let url = &resource.url;

        if resource.is_deferred() {
            debug!(url = %url, "Skipping deferred resource");
            self.emit(ResolveEvent::Skipped { url: url.clone() });
            return Ok(None);
        }

        let path = self.paths.ensure_path(url).await?;
        let prior = self.prior_validators(&path).await?;

        self.emit(ResolveEvent::Fetching {
            url: url.clone(),
            path: path.clone(),
        });
        let result = self.fetcher.fetch(url, &path, &prior).await?;

        // Content is in place before its metadata changes
        self.store.touch(&path, &result.validators).await?;

        self.emit(match result.outcome {
            FetchOutcome::Updated { bytes } => ResolveEvent::Updated {
                url: url.clone(),
                path: path.clone(),
                bytes,
            },
            FetchOutcome::NotModified => ResolveEvent::NotModified {
                url: url.clone(),
                path: path.clone(),
            },
        });

        Ok(Some(path))
    }

    /// Every resource currently held in the cache
    pub async fn cached_entries(&self) -> Result<Vec<PathBuf>, CacheError> {
        self.paths.entries().await
    }

    /// Drop the cached copy of `url`, returning whether there was one
    pub async fn purge(&self, url: &Url) -> Result<bool, CacheError> {
        let path = self.paths.to_path(url);
        let existed = fs::try_exists(&path).await?;
        self.store.remove(&path).await?;
        if existed {
            info!(url = %url, path = %path.display(), "Purged cached resource");
        }
        Ok(existed)
    }

    async fn prior_validators(&self, path: &Path) -> Result<Validators, CacheError> {
        // A leftover sidecar must not turn into a 304 for a file that is gone
        if !fs::try_exists(path).await? {
            return Ok(Validators::default());
        }
        self.store.validators(path).await
    }

    fn emit(&self, event: ResolveEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }
}
