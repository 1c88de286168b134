use std::sync::Arc;

use clap::Parser;
use jlaunch_engine::{
    CacheConfig, CacheResolver, ConditionalFetcher, ReqwestTransport, ResolveEvent, SidecarStore,
    create_client,
};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod descriptor;
mod error;
mod launch;
mod utils;

use cli::CliArgs;
use error::AppError;
use launch::LaunchCommand;

fn main() {
    match bootstrap() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            // Log the full error for debugging
            error!(error = ?e, "Launcher failed");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn bootstrap() -> Result<i32, AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    // Setup logging, stdout belongs to the application
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    info!(
        "HTTP timeout configuration: overall={}s, connect={}s, read={}s",
        args.timeout, args.connect_timeout, args.read_timeout
    );

    let fetch_config = args.fetch_config()?;
    let client = create_client(&fetch_config)?;

    let jnlp = descriptor::fetch_descriptor(&client, &args.descriptor).await?;
    let resources = descriptor::jar_resources(&jnlp)?;

    // Descriptor and jars share one connection pool
    let fetcher = ConditionalFetcher::new(ReqwestTransport::new(client))
        .with_retries(fetch_config.max_retries, fetch_config.retry_delay_base);
    let resolver = CacheResolver::with_parts(
        CacheConfig::new(&args.cache_dir),
        fetcher,
        SidecarStore::new(),
    )
    .with_event_handler(Arc::new(log_event));

    let classpath = resolver.resolve_all(&resources).await?;

    let command = LaunchCommand::build(
        &args.java,
        jnlp.j2se.as_ref(),
        &jnlp.application,
        &jnlp.properties,
        &classpath,
        &args.extra_args,
    )?;

    if args.no_launch {
        println!("{command}");
        return Ok(0);
    }

    let status = command.spawn().await?;
    // Killed by a signal
    Ok(status.code().unwrap_or(1))
}

fn log_event(event: ResolveEvent) {
    match event {
        ResolveEvent::Skipped { url } => debug!(url = %url, "Deferred, not cached"),
        ResolveEvent::Fetching { url, .. } => debug!(url = %url, "Checking"),
        ResolveEvent::Updated { url, bytes, .. } => info!(url = %url, bytes, "Downloaded"),
        ResolveEvent::NotModified { url, .. } => info!(url = %url, "Up to date"),
    }
}
