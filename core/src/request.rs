//! Request construction: path joining, query encoding, option overrides.

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, RequestBody};

/// Path relative to the configured base path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for RelativePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&[&str]> for RelativePath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.join("/"))
    }
}

impl<const N: usize> From<[&str; N]> for RelativePath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.join("/"))
    }
}

impl From<Vec<String>> for RelativePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments.join("/"))
    }
}

/// Per-call overrides applied on top of the service defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn method(method: HttpMethod) -> Self {
        Self {
            method: Some(method),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Ordered query parameters. Setting an existing key replaces its value in
/// place, so the first insertion decides the position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Applies every pair of `other`, letting `other` win on conflicts.
    pub fn merge(mut self, other: Query) -> Self {
        for (key, value) in other.0 {
            self.set(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering.
    pub fn encode(&self) -> Result<String> {
        serde_urlencoded::to_string(&self.0).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.set(key, value);
        }
        query
    }
}

/// Builds the request descriptor for one call. Performs no I/O.
pub fn build_request(
    config: &ClientConfig,
    path: &RelativePath,
    options: RequestOptions,
    query: Option<&Query>,
    body: Option<RequestBody>,
) -> Result<HttpRequest> {
    let mut full_path = format!("{}/{}", config.service.path, path.as_str());
    if let Some(query) = query {
        full_path.push('?');
        full_path.push_str(&query.encode()?);
    }

    let mut headers = config.service.headers.clone();
    for (name, value) in options.headers {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }

    Ok(HttpRequest {
        method: options.method.unwrap_or_default(),
        host: config.service.host.clone(),
        port: config.service.port,
        path: full_path,
        headers,
        body: body.map(RequestBody::into_bytes).transpose()?,
    })
}
