use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

use crate::payload::{Payload, PayloadValue};

/// Snapshot of an HTTP request attached to a log record.
///
/// Under the `request` key the converter turns it into the payload's
/// `request` descriptor; anywhere else it serializes to that same
/// descriptor inside `extra`.
#[derive(Clone, Debug)]
pub struct RequestValue {
    host: String,
    method: Method,
    url: Url,
    headers: HeaderMap,
}

impl RequestValue {
    /// Request without headers; the host defaults to the URL authority.
    pub fn new(method: Method, url: Url) -> Self {
        RequestValue {
            host: authority(&url),
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Override the `Host` the request was addressed to.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mapping sent as the payload's top-level `request` entry.
    ///
    /// Repeated query keys and repeated headers are joined with `,`.
    pub fn descriptor(&self) -> PayloadValue {
        let url = &self.url;

        let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            query.entry(key.into_owned()).or_default().push(value.into_owned());
        }

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in self.headers.iter() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let mut url_map = Payload::new();
        url_map.insert("url".into(), url.as_str().into());
        url_map.insert("scheme".into(), url.scheme().into());
        url_map.insert("host".into(), authority(url).into());
        url_map.insert("path".into(), url.path().into());
        url_map.insert("raw_query".into(), url.query().unwrap_or_default().into());
        url_map.insert("fragment".into(), url.fragment().unwrap_or_default().into());
        url_map.insert("query".into(), joined(query));

        let mut out = Payload::new();
        out.insert("host".into(), self.host.as_str().into());
        out.insert("method".into(), self.method.as_str().into());
        out.insert("url".into(), PayloadValue::Map(url_map));
        out.insert("headers".into(), joined(headers));
        PayloadValue::Map(out)
    }
}

impl From<&reqwest::Request> for RequestValue {
    fn from(req: &reqwest::Request) -> Self {
        RequestValue::new(req.method().clone(), req.url().clone()).with_headers(req.headers().clone())
    }
}

impl From<reqwest::Request> for RequestValue {
    fn from(req: reqwest::Request) -> Self {
        RequestValue::from(&req)
    }
}

/// `host[:port]`, with the port only when it is not the scheme default.
fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

fn joined(entries: BTreeMap<String, Vec<String>>) -> PayloadValue {
    PayloadValue::Map(
        entries
            .into_iter()
            .map(|(key, values)| (key, PayloadValue::String(values.join(","))))
            .collect(),
    )
}
