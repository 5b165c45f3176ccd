mod client;
mod error;
mod options;
mod tls;
mod util;

use bytes::Bytes;

pub use client::{DEFAULT_CONNECT_TIMEOUT, HttpClient};
pub use error::{Error, HttpTransportErrorKind, Result};
pub use options::{DEFAULT_TIMEOUT, RequestMethod, RequestOptions};
pub use util::normalize_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}
