pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`connections` must be a positive integer")]
    InvalidPoolSize,

    #[error("worker pool requires a running Tokio runtime")]
    NoRuntime,

    #[error("unsupported http method `{0}` (expected GET or POST)")]
    UnsupportedMethod(String),

    #[error("request url cannot be empty")]
    EmptyUrl,

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
