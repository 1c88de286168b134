use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::proxy::ProxyConfig;

const DEFAULT_USER_AGENT: &str = concat!("jlaunch/", env!("CARGO_PKG_VERSION"));

/// Configurable options for the HTTP side of the cache
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Overall timeout for the entire HTTP request, zero disables it
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Read timeout (maximum time between receiving data chunks)
    pub read_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// User agent string
    pub user_agent: String,

    /// Headers sent with every request
    pub headers: HeaderMap,

    /// Proxy configuration (optional)
    pub proxy: Option<ProxyConfig>,

    /// Whether to use system proxy settings if available
    pub use_system_proxy: bool,

    /// Extra attempts after a connect/timeout error or a 5xx status
    pub max_retries: u32,

    /// Base for exponential backoff between attempts
    pub retry_delay_base: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: FetchConfig::get_default_headers(),
            proxy: None,
            use_system_proxy: true,
            max_retries: 0,
            retry_delay_base: Duration::from_millis(500),
        }
    }
}

impl FetchConfig {
    pub fn builder() -> crate::builder::FetchConfigBuilder {
        crate::builder::FetchConfigBuilder::new()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/java-archive, */*;q=0.8"),
        );

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers
    }
}

/// Where the resource cache lives on disk
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Root directory; created on first resolution if absent
    pub root: PathBuf,
}

impl CacheConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
