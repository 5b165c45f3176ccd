use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use super::tls::insecure_client_config;
use super::util::has_scheme;
use super::{Error, HttpResponse, RequestMethod, RequestOptions, Result};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared HTTP/1.1 client. Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpClient {
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(connect_timeout));

        let connector = HttpsConnectorBuilder::new()
            .with_tls_config(insecure_client_config()?)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let inner = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { inner })
    }

    /// Sends one request and reads the full response body.
    ///
    /// A zero timeout disables the deadline; otherwise it covers the send and the body read.
    pub async fn execute(&self, opts: &RequestOptions) -> Result<HttpResponse> {
        let url = opts.request_url();
        if !has_scheme(&url) {
            return Err(Error::UnsupportedScheme(url));
        }

        let uri: hyper::Uri = url.parse().map_err(|_| Error::InvalidUrl(url.clone()))?;
        if uri.host().is_none_or(str::is_empty) {
            return Err(Error::InvalidUrl(url));
        }

        let body = match opts.method() {
            RequestMethod::Get => Bytes::new(),
            RequestMethod::Post => opts.post_body(),
        };

        let mut builder = Request::builder().method(opts.method().as_http()).uri(uri);
        for (k, v) in opts.headers() {
            let name = http::header::HeaderName::from_bytes(k.as_bytes())?;
            let value = http::header::HeaderValue::from_str(v)?;
            builder = builder.header(name, value);
        }
        let req: Request<Full<Bytes>> = builder.body(Full::new(body))?;

        let timeout = opts.timeout();
        if timeout.is_zero() {
            return self.send(req).await;
        }

        match tokio::time::timeout(timeout, self.send(req)).await {
            Ok(res) => res,
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Result<HttpResponse> {
        let res = self.inner.request(req).await?;
        let status = res.status().as_u16();
        let body = res.into_body().collect().await?.to_bytes();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpTransportErrorKind;

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_millis(200))
            .unwrap_or_else(|err| panic!("client build failed: {err}"))
    }

    #[tokio::test]
    async fn unreachable_host_fails_with_transport_error() {
        // TEST-NET-1 is reserved and never routed.
        let opts =
            RequestOptions::new("http://192.0.2.1:81/").with_timeout(Duration::from_secs(2));

        let err = match client().execute(&opts).await {
            Ok(res) => panic!("expected failure, got status {}", res.status),
            Err(err) => err,
        };
        assert!(matches!(
            err.transport_error_kind(),
            HttpTransportErrorKind::Request | HttpTransportErrorKind::Timeout
        ));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let opts = RequestOptions::new("ftp://example.com/file");

        let err = client().execute(&opts).await.err();
        assert!(matches!(err, Some(Error::UnsupportedScheme(u)) if u == "ftp://example.com/file"));
    }

    #[tokio::test]
    async fn rejects_bad_header_name() {
        let opts = RequestOptions::new("http://127.0.0.1:1/").with_headers([("bad header", "x")]);

        let err = client().execute(&opts).await.err();
        assert!(matches!(err, Some(Error::HeaderName(_))));
    }
}
