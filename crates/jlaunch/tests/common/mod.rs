#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use jlaunch_engine::cache::parse_http_date;
use jlaunch_engine::{
    CacheError, HttpTransport, RevalidationStore, TransportRequest, TransportResponse, Validators,
};
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::{
    ETAG, HeaderMap, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use url::Url;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Something the fake origin does instead of serving the resource
#[derive(Debug, Clone)]
pub enum Fault {
    Status(StatusCode),
    /// Sends the first chunk of the body, then fails
    BrokenBody,
}

#[derive(Debug, Clone)]
struct Document {
    body: Bytes,
    last_modified: Option<String>,
    etag: Option<String>,
}

#[derive(Default)]
struct OriginState {
    documents: HashMap<Url, Document>,
    faults: HashMap<Url, VecDeque<Fault>>,
    requests: Vec<TransportRequest>,
}

/// In-process origin server that honours conditional requests
#[derive(Clone, Default)]
pub struct FakeOrigin {
    state: Arc<Mutex<OriginState>>,
}

impl FakeOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(
        &self,
        url: &Url,
        body: &'static [u8],
        last_modified: Option<&str>,
        etag: Option<&str>,
    ) {
        self.state.lock().documents.insert(
            url.clone(),
            Document {
                body: Bytes::from_static(body),
                last_modified: last_modified.map(str::to_string),
                etag: etag.map(str::to_string),
            },
        );
    }

    pub fn fail_next(&self, url: &Url, fault: Fault) {
        self.state
            .lock()
            .faults
            .entry(url.clone())
            .or_default()
            .push_back(fault);
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.state.lock().requests.clone()
    }

    pub fn requests_for(&self, url: &Url) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|request| &request.url == url)
            .collect()
    }

    fn is_fresh(document: &Document, headers: &HeaderMap) -> bool {
        if let Some(since) = headers.get(IF_MODIFIED_SINCE) {
            let (Some(current), Ok(since)) = (&document.last_modified, since.to_str()) else {
                return false;
            };
            return match (parse_http_date(current), parse_http_date(since)) {
                (Ok(current), Ok(since)) => current <= since,
                _ => false,
            };
        }

        if let Some(tag) = headers.get(IF_NONE_MATCH) {
            return document
                .etag
                .as_deref()
                .is_some_and(|etag| tag.to_str().is_ok_and(|tag| tag == etag));
        }

        false
    }
}

fn response(status: StatusCode, headers: HeaderMap, chunks: Vec<Result<Bytes, CacheError>>) -> TransportResponse {
    TransportResponse {
        status,
        headers,
        body: futures::stream::iter(chunks).boxed(),
    }
}

#[async_trait]
impl HttpTransport for FakeOrigin {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, CacheError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        let fault = state
            .faults
            .get_mut(&request.url)
            .and_then(|queue| queue.pop_front());
        let document = state.documents.get(&request.url).cloned();
        drop(state);

        let Some(document) = document else {
            return Ok(response(StatusCode::NOT_FOUND, HeaderMap::new(), vec![]));
        };

        match fault {
            Some(Fault::Status(status)) => {
                return Ok(response(status, HeaderMap::new(), vec![]));
            }
            Some(Fault::BrokenBody) => {
                let half = document.body.slice(..document.body.len() / 2);
                return Ok(response(
                    StatusCode::OK,
                    HeaderMap::new(),
                    vec![
                        Ok(half),
                        Err(CacheError::Io(io::Error::new(
                            io::ErrorKind::ConnectionReset,
                            "connection reset by peer",
                        ))),
                    ],
                ));
            }
            None => {}
        }

        if Self::is_fresh(&document, &request.headers) {
            return Ok(response(StatusCode::NOT_MODIFIED, HeaderMap::new(), vec![]));
        }

        let mut headers = HeaderMap::new();
        if let Some(last_modified) = &document.last_modified {
            headers.insert(LAST_MODIFIED, HeaderValue::from_str(last_modified).unwrap());
        }
        if let Some(etag) = &document.etag {
            headers.insert(ETAG, HeaderValue::from_str(etag).unwrap());
        }

        // Two chunks so the body is really streamed
        let split = document.body.len() / 2;
        Ok(response(
            StatusCode::OK,
            headers,
            vec![
                Ok(document.body.slice(..split)),
                Ok(document.body.slice(split..)),
            ],
        ))
    }
}

/// Store that keeps validators in memory instead of on disk
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<PathBuf, Validators>>>,
}

impl MemoryStore {
    pub fn get(&self, path: &Path) -> Option<Validators> {
        self.entries.lock().get(path).cloned()
    }
}

#[async_trait]
impl RevalidationStore for MemoryStore {
    async fn last_modified(&self, path: &Path) -> Result<Option<String>, CacheError> {
        Ok(self.get(path).and_then(|v| v.last_modified))
    }

    async fn etag(&self, path: &Path) -> Result<Option<String>, CacheError> {
        Ok(self.get(path).and_then(|v| v.etag))
    }

    async fn touch(&self, path: &Path, validators: &Validators) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(path.to_path_buf()).or_default();
        if validators.last_modified.is_some() {
            entry.last_modified = validators.last_modified.clone();
        }
        if validators.etag.is_some() {
            entry.etag = validators.etag.clone();
        }
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<(), CacheError> {
        self.entries.lock().remove(path);
        let _ = std::fs::remove_file(path);
        Ok(())
    }
}
