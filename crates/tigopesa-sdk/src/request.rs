//! Outbound request descriptors.
//!
//! A [`RequestDescriptor`] is built once per call with
//! [`RequestDescriptor::builder`] and consumed by
//! [`crate::HttpTransport::send`]. The payload is encoded when the
//! descriptor is built, so the transport only ever sees bytes.
//!
//! Every descriptor starts with `Content-Type` (matching its payload
//! kind) and `Cache-Control: no-cache`; builder options then apply in
//! call order.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Serialize;
use tigopesa_models::{codec, CodecError, PayloadKind};

/// Header map: keys unique (ignoring ASCII case), case kept as supplied.
pub type Headers = BTreeMap<String, String>;

/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Cache-Control` header name.
pub const CACHE_CONTROL: &str = "Cache-Control";
/// `Authorization` header name.
pub const AUTHORIZATION: &str = "Authorization";

/// Insert `name: value`, replacing any existing key that differs only in case.
fn set_header(headers: &mut Headers, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

fn default_headers(kind: PayloadKind) -> Headers {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE.into(), kind.content_type().into());
    headers.insert(CACHE_CONTROL.into(), "no-cache".into());
    headers
}

// ---------------------------------------------------------------------------
// RequestDescriptor
// ---------------------------------------------------------------------------

/// A fully-built outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    kind: PayloadKind,
    body: Option<Vec<u8>>,
    headers: Headers,
}

impl RequestDescriptor {
    /// Start building a request.
    ///
    /// ```
    /// use reqwest::Method;
    /// use tigopesa_sdk::{PayloadKind, RequestDescriptor};
    ///
    /// let request = RequestDescriptor::builder(Method::POST, "http://provider.test/token", PayloadKind::Form)
    ///     .payload(&[("username", "merchant")])
    ///     .merge_headers([("X-Trace", "1")])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.header("content-type"), Some("application/x-www-form-urlencoded"));
    /// assert_eq!(request.header("Cache-Control"), Some("no-cache"));
    /// assert_eq!(request.body(), Some(&b"username=merchant"[..]));
    /// ```
    pub fn builder(method: Method, url: impl Into<String>, kind: PayloadKind) -> RequestBuilder {
        RequestBuilder {
            method,
            url: url.into(),
            kind,
            body: Ok(None),
            headers: default_headers(kind),
        }
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL, unvalidated.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Payload kind of the body.
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// Encoded body, if a payload was supplied.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// All headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Same request with one more header.
    pub(crate) fn with_header(mut self, name: &str, value: String) -> Self {
        set_header(&mut self.headers, name.to_string(), value);
        self
    }
}

// ---------------------------------------------------------------------------
// RequestBuilder
// ---------------------------------------------------------------------------

/// Builder returned by [`RequestDescriptor::builder`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    kind: PayloadKind,
    body: Result<Option<Vec<u8>>, CodecError>,
    headers: Headers,
}

impl RequestBuilder {
    /// Encode `value` as the body using the request's payload kind.
    ///
    /// Encoding errors surface from [`RequestBuilder::build`].
    #[must_use]
    pub fn payload<T: Serialize>(mut self, value: &T) -> Self {
        self.body = codec::encode(self.kind, value).map(Some);
        self
    }

    /// Replace the entire header set, defaults included.
    #[must_use]
    pub fn replace_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = Headers::new();
        self.merge_headers(headers)
    }

    /// Add headers, overwriting same-named ones and keeping the rest.
    #[must_use]
    pub fn merge_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            set_header(&mut self.headers, name.into(), value.into());
        }
        self
    }

    /// Add one header.
    #[must_use]
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.merge_headers([(name.into(), value.into())])
    }

    /// Send caller credentials as `username` / `password` headers.
    #[must_use]
    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.merge_headers([
            ("username".to_string(), username.into()),
            ("password".to_string(), password.into()),
        ])
    }

    /// Finish the descriptor.
    pub fn build(self) -> Result<RequestDescriptor, CodecError> {
        Ok(RequestDescriptor {
            method: self.method,
            url: self.url,
            kind: self.kind,
            body: self.body?,
            headers: self.headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Ping {
        #[serde(rename = "ReferenceID")]
        reference_id: &'static str,
    }

    fn post(kind: PayloadKind) -> RequestBuilder {
        RequestDescriptor::builder(Method::POST, "http://provider.test/x", kind)
    }

    #[test]
    fn defaults_are_present() {
        let request = post(PayloadKind::Xml).build().unwrap();
        assert_eq!(request.header(CONTENT_TYPE), Some("application/xml"));
        assert_eq!(request.header(CACHE_CONTROL), Some("no-cache"));
        assert_eq!(request.headers().len(), 2);
        assert!(request.body().is_none());
    }

    #[test]
    fn payload_is_encoded_at_build() {
        let request = post(PayloadKind::Json)
            .payload(&Ping { reference_id: "HC1" })
            .build()
            .unwrap();
        assert_eq!(request.body(), Some(&br#"{"ReferenceID":"HC1"}"#[..]));
        assert_eq!(request.kind(), PayloadKind::Json);
    }

    #[test]
    fn merge_overwrites_same_key_and_keeps_others() {
        let request = post(PayloadKind::Json)
            .merge_headers([("X-A", "1"), ("X-B", "2")])
            .merge_headers([("x-a", "3")])
            .build()
            .unwrap();
        assert_eq!(request.header("X-A"), Some("3"));
        assert_eq!(request.header("X-B"), Some("2"));
        assert_eq!(request.header(CACHE_CONTROL), Some("no-cache"));
        // Case of the latest writer wins; no duplicate keys.
        assert!(request.headers().contains_key("x-a"));
        assert!(!request.headers().contains_key("X-A"));
    }

    #[test]
    fn replace_drops_defaults() {
        let request = post(PayloadKind::Json)
            .replace_headers([("Accept", "application/json")])
            .build()
            .unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header(CONTENT_TYPE), None);
    }

    #[test]
    fn options_apply_in_call_order() {
        let request = post(PayloadKind::Json)
            .header("X-Trace", "1")
            .replace_headers([("X-Only", "yes")])
            .credentials("merchant", "s3cret")
            .build()
            .unwrap();
        assert_eq!(request.header("X-Trace"), None);
        assert_eq!(request.header("X-Only"), Some("yes"));
        assert_eq!(request.header("username"), Some("merchant"));
        assert_eq!(request.header("password"), Some("s3cret"));
    }

    #[test]
    fn content_type_override() {
        let request = post(PayloadKind::Xml)
            .header("content-type", "text/xml")
            .build()
            .unwrap();
        assert_eq!(request.header(CONTENT_TYPE), Some("text/xml"));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn unvalidated_url_is_kept() {
        let request = RequestDescriptor::builder(Method::GET, "not a url", PayloadKind::Json)
            .build()
            .unwrap();
        assert_eq!(request.url(), "not a url");
    }

    #[test]
    fn encode_failure_surfaces_at_build() {
        #[derive(Serialize)]
        struct Nested {
            inner: Ping,
        }
        let result = post(PayloadKind::Form)
            .payload(&Nested {
                inner: Ping { reference_id: "R" },
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn with_header_adds_authorization() {
        let request = post(PayloadKind::Json)
            .build()
            .unwrap()
            .with_header(AUTHORIZATION, "bearer t0k".into());
        assert_eq!(request.header("authorization"), Some("bearer t0k"));
    }
}
