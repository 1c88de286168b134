//! # HTTP Transport
//!
//! The single network operation the cache needs, behind a trait so the
//! fetcher can run against a fake origin in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::CacheError;

/// Response body as a stream of chunks
pub type BodyStream = BoxStream<'static, Result<Bytes, CacheError>>;

/// A GET request with the headers to attach to it
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a GET; only transport failures are errors, any status is a response
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, CacheError>;
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, CacheError> {
        let response = self
            .client
            .get(request.url)
            .headers(request.headers)
            .send()
            .await?;

        Ok(TransportResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map_err(CacheError::from))
                .boxed(),
        })
    }
}
