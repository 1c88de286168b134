use reqwest::Proxy;

use crate::CacheError;

/// Credentials for an authenticating proxy
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

/// Explicit proxy used for every request
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy URL, the scheme selects the kind (`http://`, `https://`, `socks5://`)
    pub url: String,
    pub auth: Option<ProxyAuth>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(ProxyAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

/// Build a reqwest proxy covering all schemes from our configuration
pub fn build_proxy(config: &ProxyConfig) -> Result<Proxy, CacheError> {
    // A bare `host:port` is taken as an HTTP proxy
    let url = if config.url.contains("://") {
        config.url.clone()
    } else {
        format!("http://{}", config.url)
    };

    let mut proxy =
        Proxy::all(&url).map_err(|e| CacheError::Proxy(format!("{}: {e}", config.url)))?;

    if let Some(auth) = &config.auth {
        proxy = proxy.basic_auth(&auth.username, &auth.password);
    }

    Ok(proxy)
}
