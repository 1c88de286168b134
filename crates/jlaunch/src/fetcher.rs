//! # Conditional Fetcher
//!
//! Revalidates one cache entry against its origin. A `304 Not Modified`
//! leaves the entry alone; fresh content is streamed into a `.part.`
//! sibling and renamed into place only once the body is complete.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::CacheError;
use crate::cache::{FetchResult, Validators, extract_validators, partial_path};
use crate::transport::{BodyStream, HttpTransport, TransportRequest, TransportResponse};

pub struct ConditionalFetcher<T> {
    transport: T,
    max_retries: u32,
    retry_delay_base: Duration,
}

impl<T: HttpTransport> ConditionalFetcher<T> {
    /// Fetcher that makes a single attempt per request
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_retries: 0,
            retry_delay_base: Duration::ZERO,
        }
    }

    /// Retry connect/timeout errors and 5xx statuses with exponential backoff
    pub fn with_retries(mut self, max_retries: u32, delay_base: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_base = delay_base;
        self
    }

    /// Revalidate `path` against `url` using the `prior` validators
    ///
    /// The returned validators are for the caller to persist; this method
    /// only ever writes the body content itself.
    #[instrument(skip(self, url, prior), fields(url = %url), level = "debug")]
    pub async fn fetch(
        &self,
        url: &Url,
        path: &Path,
        prior: &Validators,
    ) -> Result<FetchResult, CacheError> {
        let headers = conditional_headers(prior);
        let conditional = !headers.is_empty();

        let response = self.send_with_retries(url, headers).await?;
        let status = response.status;

        if status == StatusCode::NOT_MODIFIED {
            if !conditional {
                return Err(CacheError::UnexpectedNotModified(url.to_string()));
            }
            debug!(path = %path.display(), "Cached copy is current");
            return Ok(FetchResult::not_modified());
        }

        if !status.is_success() {
            return Err(CacheError::Status {
                url: url.to_string(),
                status,
            });
        }

        let validators = extract_validators(&response.headers);
        let bytes = write_body(path, response.body).await?;
        info!(
            path = %path.display(),
            bytes,
            last_modified = ?validators.last_modified,
            etag = ?validators.etag,
            "Downloaded fresh content"
        );

        Ok(FetchResult::updated(bytes, validators))
    }

    async fn send_with_retries(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<TransportResponse, CacheError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let request = TransportRequest {
                url: url.clone(),
                headers: headers.clone(),
            };

            match self.transport.get(request).await {
                Ok(response)
                    if response.status.is_server_error() && attempts <= self.max_retries =>
                {
                    warn!(url = %url, status = %response.status, attempts, "Server error, retrying");
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempts <= self.max_retries => {
                    warn!(url = %url, error = %e, attempts, "Network error, retrying");
                }
                Err(e) => return Err(e),
            }

            let delay = self
                .retry_delay_base
                .saturating_mul(2_u32.saturating_pow(attempts - 1));
            tokio::time::sleep(delay).await;
        }
    }
}

/// Build the revalidation header; `If-Modified-Since` wins over `If-None-Match`
fn conditional_headers(prior: &Validators) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let candidate = prior
        .last_modified
        .as_deref()
        .map(|value| (IF_MODIFIED_SINCE, value))
        .or_else(|| prior.etag.as_deref().map(|value| (IF_NONE_MATCH, value)));

    if let Some((name, value)) = candidate {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => warn!(header = %name, value, "Stored validator is not a valid header value, fetching unconditionally"),
        }
    }

    headers
}

/// Stream the body next to `path`, then move it into place
async fn write_body(path: &Path, mut body: BodyStream) -> Result<u64, CacheError> {
    let partial = partial_path(path)?;

    match stream_to_file(&partial, &mut body).await {
        Ok(written) => {
            if let Err(e) = fs::rename(&partial, path).await {
                let _ = fs::remove_file(&partial).await;
                return Err(e.into());
            }
            Ok(written)
        }
        Err(e) => {
            warn!(path = %partial.display(), error = %e, "Discarding incomplete download");
            let _ = fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

async fn stream_to_file(target: &Path, body: &mut BodyStream) -> Result<u64, CacheError> {
    let mut file = fs::File::create(target).await?;
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
