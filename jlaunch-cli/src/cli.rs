use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use jlaunch_engine::{FetchConfig, ProxyConfig};
use tracing::info;
use url::Url;

use crate::error::AppError;
use crate::utils::parse_headers;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Java Web Start launcher with a local jar cache",
    long_about = "Fetches a JNLP descriptor, brings its jars into a local cache and launches\n\
                  the application with the configured Java runtime.\n\
                  \n\
                  Cached jars are revalidated with conditional requests, so repeated\n\
                  launches only download what changed on the server."
)]
pub struct CliArgs {
    /// URL of the JNLP descriptor
    #[arg(value_name = "DESCRIPTOR_URL")]
    pub descriptor: Url,

    /// Cache directory
    #[arg(value_name = "CACHE_DIR", help = "Directory holding the jar cache (created if missing)")]
    pub cache_dir: PathBuf,

    /// Arguments appended after the descriptor's own application arguments
    #[arg(value_name = "EXTRA_ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,

    /// Java executable
    #[arg(long, default_value = "java", help = "Java executable used to start the application")]
    pub java: PathBuf,

    #[arg(long, help = "Resolve the cache and print the command instead of running it")]
    pub no_launch: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    /// Overall timeout in seconds
    #[arg(
        long,
        default_value = "0",
        help = "Overall timeout in seconds for HTTP requests (0 disables it)"
    )]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "10",
        help = "Connection timeout in seconds (time to establish initial connection)"
    )]
    pub connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(
        long,
        default_value = "30",
        help = "Read timeout in seconds (maximum time between receiving data chunks)"
    )]
    pub read_timeout: u64,

    #[arg(
        long,
        default_value = "0",
        help = "Retries for connection failures and server errors, with exponential backoff"
    )]
    pub retries: u32,

    /// Proxy URL (e.g., "http://proxy.example.com:8080")
    #[arg(
        long,
        help = "Proxy server URL, the scheme selects the kind (http, https, socks5)"
    )]
    pub proxy: Option<String>,

    /// Proxy username
    #[arg(long, help = "Username for proxy authentication", requires = "proxy")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, help = "Password for proxy authentication", requires = "proxy_user")]
    pub proxy_pass: Option<String>,

    /// Disable all proxy settings
    #[arg(
        long,
        conflicts_with = "proxy",
        help = "Disable all proxy settings (including system proxy)"
    )]
    pub no_proxy: bool,

    /// Custom HTTP headers
    #[arg(
        long = "header",
        short = 'H',
        help = "Add custom HTTP header to requests (can be used multiple times). Format: 'Name: Value'",
        value_name = "HEADER"
    )]
    pub headers: Vec<String>,
}

impl CliArgs {
    /// HTTP settings for both the descriptor and the jars
    pub fn fetch_config(&self) -> Result<FetchConfig, AppError> {
        let mut builder = FetchConfig::builder()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_read_timeout(Duration::from_secs(self.read_timeout))
            .with_headers(parse_headers(&self.headers)?)
            .with_retries(self.retries, Duration::from_millis(500));

        if self.no_proxy {
            info!("All proxy settings disabled (--no-proxy flag)");
            builder = builder.with_system_proxy(false);
        } else if let Some(proxy_url) = &self.proxy {
            let mut proxy = ProxyConfig::new(proxy_url);
            match (&self.proxy_user, &self.proxy_pass) {
                (Some(username), Some(password)) => proxy = proxy.with_auth(username, password),
                (Some(_), None) => {
                    return Err(AppError::InvalidInput(
                        "--proxy-user requires --proxy-pass".to_string(),
                    ));
                }
                _ => {}
            }
            info!(
                proxy_url = %proxy_url,
                has_auth = proxy.auth.is_some(),
                "Using explicit proxy configuration"
            );
            builder = builder.with_proxy(proxy);
        }

        Ok(builder.build())
    }
}
