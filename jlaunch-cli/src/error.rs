use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch descriptor: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] jlaunch_engine::CacheError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] jnlp::JnlpError),

    #[error("Cannot build classpath: {0}")]
    ClassPath(#[from] std::env::JoinPathsError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),
}
