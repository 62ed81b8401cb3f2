//! Diagnostic hooks invoked around each call.
//!
//! Observers only watch; nothing they do changes the outcome of a call.

use crate::decode::Decoded;
use crate::http::HttpRequest;

pub trait RequestObserver: Send + Sync {
    /// Called with the finished descriptor, before it reaches the transport.
    fn on_request(&self, _seq: u64, _request: &HttpRequest) {}

    /// Called after a response was decoded and passed the error check.
    fn on_response(&self, _seq: u64, _decoded: &Decoded) {}
}

/// Ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}

/// Emits `tracing` debug events. Query strings are left out because they
/// carry the account credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, seq: u64, request: &HttpRequest) {
        tracing::debug!(
            seq,
            method = request.method.as_str(),
            host = %request.host,
            port = request.port,
            path = request.path_without_query(),
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "gocanvas request"
        );
    }

    fn on_response(&self, seq: u64, decoded: &Decoded) {
        match decoded {
            Decoded::Xml(value) => tracing::debug!(seq, kind = "xml", result = %value, "gocanvas response"),
            Decoded::Raw(bytes) => tracing::debug!(seq, kind = "raw", len = bytes.len(), "gocanvas response"),
        }
    }
}
