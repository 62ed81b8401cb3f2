//! HTTP request and response types exchanged with a `Transport`.
//!
//! # Design
//! These types describe requests and responses as plain data. The client
//! builds an `HttpRequest`, hands it to a transport, and decodes the
//! `HttpResponse` that comes back. Keeping them free of any HTTP library
//! types means the building and decoding steps stay deterministic and can be
//! tested without a network.

use crate::error::{ApiError, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` already contains the base path and the encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// `https` on port 443, plain `http` everywhere else.
    pub fn scheme(&self) -> &'static str {
        if self.port == 443 {
            "https"
        } else {
            "http"
        }
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme(), self.host, self.port, self.path)
    }

    /// The path with the query string cut off.
    pub fn path_without_query(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(path, _)| path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response with its body fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Payload attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Bytes(Vec<u8>),
    /// Sent as JSON text.
    Structured(serde_json::Value),
}

impl RequestBody {
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            RequestBody::Text(text) => Ok(text.into_bytes()),
            RequestBody::Bytes(bytes) => Ok(bytes),
            RequestBody::Structured(value) => {
                serde_json::to_vec(&value).map_err(|e| ApiError::Serialization(e.to_string()))
            }
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Structured(value)
    }
}
