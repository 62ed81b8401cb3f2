//! Network execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only place the client performs I/O, so tests and
//! embedders can substitute their own executor. `HttpTransport` is the
//! reqwest-backed default: TLS on port 443, plain HTTP otherwise, whole body
//! buffered before returning, and no idle connections kept between calls.

use async_trait::async_trait;
use reqwest::Method;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(method(request.method), request.url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        // Header values may carry opaque bytes (e.g. a Latin-1 filename).
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_string(), value)
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
