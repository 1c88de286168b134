//! # Builder for FetchConfig
//!
//! Fluent construction of [`FetchConfig`] values.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use jlaunch_engine::FetchConfig;
//! use jlaunch_engine::proxy::ProxyConfig;
//!
//! let config = FetchConfig::builder()
//!     .with_timeout(Duration::from_secs(120))
//!     .with_connect_timeout(Duration::from_secs(15))
//!     .with_user_agent("MyLauncher/1.0")
//!     .with_header("X-Api-Key", "my-secret-key")
//!     .with_retries(2, Duration::from_millis(250))
//!     .build();
//!
//! let config_with_proxy = FetchConfig::builder()
//!     .with_proxy(ProxyConfig::new("http://proxy.example.com:8080").with_auth("user", "pass"))
//!     .build();
//! # let _ = (config, config_with_proxy);
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{FetchConfig, proxy::ProxyConfig};

/// Builder for creating FetchConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Set the overall timeout for the entire HTTP request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom HTTP header, invalid names or values are ignored
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Merge headers into the configuration
    ///
    /// A name already present is replaced by every value given for it here;
    /// repeated names in `headers` are all kept.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for name in headers.keys() {
            self.config.headers.remove(name);
        }
        for (name, value) in headers.iter() {
            self.config.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// Set the proxy configuration
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self.config.use_system_proxy = false; // Explicit proxy overrides system proxy
        self
    }

    /// Set whether to use system proxy settings if available
    pub fn with_system_proxy(mut self, use_system_proxy: bool) -> Self {
        // Only set system proxy if no explicit proxy is configured
        if self.config.proxy.is_none() {
            self.config.use_system_proxy = use_system_proxy;
        }
        self
    }

    /// Retry transient failures `max_retries` times, doubling `delay_base` each attempt
    pub fn with_retries(mut self, max_retries: u32, delay_base: Duration) -> Self {
        self.config.max_retries = max_retries;
        self.config.retry_delay_base = delay_base;
        self
    }

    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl Default for FetchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
