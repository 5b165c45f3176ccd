use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use serde::Deserialize;

use crate::http::{DEFAULT_TIMEOUT, RequestMethod, RequestOptions, normalize_url};
use crate::{Error, Result};

/// One entry of a JSON batch file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BenchmarkItem {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub method: String,
    /// Values below 1 are treated as 1.
    pub times: i64,
    pub body: Option<String>,
}

impl BenchmarkItem {
    pub fn times(&self) -> u64 {
        u64::try_from(self.times).unwrap_or(0).max(1)
    }
}

/// Parses a JSON array of [`BenchmarkItem`]s.
pub fn parse_batch(input: &str) -> Result<Vec<BenchmarkItem>> {
    Ok(serde_json::from_str(input)?)
}

pub fn load_batch_file(path: &Path) -> Result<Vec<BenchmarkItem>> {
    let input = std::fs::read_to_string(path)?;
    parse_batch(&input)
}

/// Validated request description the benchmark submits `times` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    url: String,
    method: RequestMethod,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    body: Option<Bytes>,
    timeout: Duration,
    times: u64,
}

impl RequestSpec {
    /// GET `url` once with the default timeout. The url gets `http://` when it has no scheme.
    pub fn new(url: &str) -> Result<Self> {
        let url = normalize_url(url).ok_or(Error::EmptyUrl)?;
        if url::Url::parse(&url).is_err() {
            return Err(Error::InvalidUrl(url));
        }

        Ok(Self {
            url,
            method: RequestMethod::Get,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            times: 1,
        })
    }

    pub fn from_item(item: &BenchmarkItem, timeout: Duration) -> Result<Self> {
        Ok(Self::new(&item.url)?
            .with_method(RequestMethod::parse(&item.method)?)
            .with_headers(item.headers.clone())
            .with_params(item.params.clone())
            .with_body(item.body.clone().map(Bytes::from))
            .with_timeout(timeout)
            .with_times(item.times()))
    }

    /// Builds specs for every item, failing on the first invalid one.
    pub fn from_items(items: &[BenchmarkItem], timeout: Duration) -> Result<Vec<Self>> {
        items
            .iter()
            .map(|item| Self::from_item(item, timeout))
            .collect()
    }

    #[must_use]
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<Bytes>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_times(mut self, times: u64) -> Self {
        self.times = times.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn times(&self) -> u64 {
        self.times
    }

    /// Fresh options bundle for one submission; hooks mutate the copy, never the spec.
    pub fn to_options(&self) -> RequestOptions {
        RequestOptions::new(self.url.clone())
            .with_method(self.method)
            .with_headers(self.headers.clone())
            .with_params(self.params.clone())
            .with_body(self.body.clone())
            .with_timeout(self.timeout)
    }
}

/// Total submissions across `specs`.
pub fn planned_requests(specs: &[RequestSpec]) -> u64 {
    specs.iter().map(RequestSpec::times).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_fields_default_when_missing() {
        let items = parse_batch(r#"[{"url": "http://a.test/"}, {"url": "b.test", "method": "post", "times": 3}]"#)
            .unwrap_or_else(|err| panic!("parse failed: {err}"));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].times(), 1);
        assert!(items[0].headers.is_empty());
        assert_eq!(items[1].times(), 3);
        assert_eq!(items[1].method, "post");
    }

    #[test]
    fn times_below_one_clamps_to_one() {
        let items = parse_batch(r#"[{"url": "x", "times": 0}, {"url": "y", "times": -5}]"#)
            .unwrap_or_else(|err| panic!("parse failed: {err}"));
        assert!(items.iter().all(|i| i.times() == 1));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_batch("[{"), Err(Error::Json(_))));
        assert!(matches!(parse_batch(r#"{"url": "x"}"#), Err(Error::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_batch_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(err, Err(Error::Io(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("batch.json");
        std::fs::write(&path, r#"[{"url": "http://a.test/", "times": 2}]"#)
            .unwrap_or_else(|err| panic!("write: {err}"));

        let items = load_batch_file(&path).unwrap_or_else(|err| panic!("load: {err}"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].times(), 2);
    }

    #[test]
    fn spec_from_item_normalizes_and_validates() {
        let item = BenchmarkItem {
            url: " localhost:8080/ping ".to_string(),
            method: "Post".to_string(),
            params: BTreeMap::from([("k".to_string(), "v".to_string())]),
            times: 4,
            ..Default::default()
        };

        let spec = RequestSpec::from_item(&item, Duration::from_secs(1))
            .unwrap_or_else(|err| panic!("spec: {err}"));
        assert_eq!(spec.url(), "http://localhost:8080/ping");
        assert_eq!(spec.method(), RequestMethod::Post);
        assert_eq!(spec.times(), 4);

        let opts = spec.to_options();
        assert_eq!(opts.timeout(), Duration::from_secs(1));
        assert_eq!(opts.post_body(), Bytes::from_static(b"k=v"));
    }

    #[test]
    fn spec_rejects_bad_input() {
        assert!(matches!(RequestSpec::new(""), Err(Error::EmptyUrl)));

        let item = BenchmarkItem {
            url: "http://a.test".to_string(),
            method: "DELETE".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RequestSpec::from_item(&item, DEFAULT_TIMEOUT),
            Err(Error::UnsupportedMethod(_))
        ));
        assert!(matches!(
            RequestSpec::from_items(&[], DEFAULT_TIMEOUT),
            Ok(specs) if specs.is_empty()
        ));
    }

    #[test]
    fn planned_requests_sums_times() {
        let specs = vec![
            RequestSpec::new("a.test").map(|s| s.with_times(3)),
            RequestSpec::new("b.test"),
        ]
        .into_iter()
        .collect::<Result<Vec<_>>>()
        .unwrap_or_else(|err| panic!("spec: {err}"));
        assert_eq!(planned_requests(&specs), 4);
    }
}
