use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;

use super::util::normalize_url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
}

impl RequestMethod {
    /// Parses a method name case-insensitively; an empty string means GET.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Get);
        }
        s.parse()
            .map_err(|_| crate::Error::UnsupportedMethod(s.to_string()))
    }

    pub(crate) fn as_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
        }
    }
}

/// Everything needed to issue one HTTP transaction.
///
/// Header names keep the caller's spelling and are single-valued: setting a header replaces any
/// existing one whose name matches case-insensitively. The spelling is kept only in the bundle:
/// hyper writes HTTP/1.1 header names in lowercase on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    url: String,
    method: RequestMethod,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    body: Option<Bytes>,
    timeout: Duration,
}

impl RequestOptions {
    /// `url` is used verbatim; see [`RequestOptions::set_url`] for the normalizing setter.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.set_header(k, v);
        }
        self
    }

    #[must_use]
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.set_param(k, v);
        }
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

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lowercased value of the `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.to_ascii_lowercase())
    }

    /// Trims and scheme-prefixes `url`; blank input leaves the current url untouched.
    pub fn set_url(&mut self, url: &str) {
        if let Some(url) = normalize_url(url) {
            self.url = url;
        }
    }

    pub fn set_method(&mut self, method: RequestMethod) {
        self.method = method;
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|k, _| !k.eq_ignore_ascii_case(&name) || *k == name);
        self.headers.insert(name, value.into());
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Params as an `application/x-www-form-urlencoded` string (empty when there are none).
    pub fn encoded_params(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// Target url with params folded into the query string for GET.
    pub fn request_url(&self) -> String {
        if self.method != RequestMethod::Get || self.params.is_empty() {
            return self.url.clone();
        }

        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{sep}{}", self.url, self.encoded_params())
    }

    /// Bytes sent as the POST body: explicit body, else JSON params for `application/json`,
    /// else form-encoded params.
    pub fn post_body(&self) -> Bytes {
        if let Some(body) = &self.body {
            return body.clone();
        }

        let is_json = self
            .content_type()
            .is_some_and(|ct| ct.split(';').next().map(str::trim) == Some("application/json"));
        if is_json
            && !self.params.is_empty()
            && let Ok(json) = serde_json::to_vec(&self.params)
        {
            return Bytes::from(json);
        }

        Bytes::from(self.encoded_params())
    }
}
