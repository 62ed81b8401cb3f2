//! The request/response pipeline shared by every API call.
//!
//! # Design
//! A call runs build → observe → send → decode → unwrap envelope → observe.
//! Building and decoding are pure functions in `request` and `decode`; the
//! only I/O happens inside the `Transport`. The client itself holds the
//! merged configuration, the transport, an observer and a call counter. The
//! counter only labels diagnostics, so relaxed ordering is enough.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::{ClientConfig, ConfigOverrides};
use crate::decode::{decode_response, Decoded};
use crate::envelope::unwrap_service_error;
use crate::error::Result;
use crate::http::{HttpRequest, RequestBody};
use crate::observe::{RequestObserver, TracingObserver};
use crate::request::{build_request, Query, RelativePath, RequestOptions};
use crate::transport::{HttpTransport, Transport};

/// Asynchronous client for the GoCanvas API.
pub struct GoCanvas<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
    observer: Arc<dyn RequestObserver>,
    next_seq: AtomicU64,
}

impl GoCanvas<HttpTransport> {
    /// Client using the default reqwest transport.
    pub fn new(overrides: &ConfigOverrides) -> Result<Self> {
        Ok(Self::with_transport(overrides, HttpTransport::new()?))
    }
}

impl<T: Transport> GoCanvas<T> {
    pub fn with_transport(overrides: &ConfigOverrides, transport: T) -> Self {
        let config = ClientConfig::merged(overrides);
        tracing::debug!(
            host = %config.service.host,
            port = config.service.port,
            base_path = %config.service.path,
            "gocanvas client created"
        );
        Self {
            config,
            transport,
            observer: Arc::new(TracingObserver),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Replaces the default `TracingObserver`.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the descriptor a call to `request` would send, without sending it.
    pub fn build_request(
        &self,
        path: impl Into<RelativePath>,
        options: RequestOptions,
        query: Option<&Query>,
        body: Option<RequestBody>,
    ) -> Result<HttpRequest> {
        build_request(&self.config, &path.into(), options, query, body)
    }

    /// Sends a request to `path` under the base path and decodes the answer.
    pub async fn request(
        &self,
        path: impl Into<RelativePath>,
        options: RequestOptions,
        query: Option<&Query>,
        body: Option<RequestBody>,
    ) -> Result<Decoded> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let request = self.build_request(path, options, query, body)?;
        self.execute(seq, request).await
    }

    /// Like `request`, addressed at the base path itself.
    pub async fn request_root(
        &self,
        options: RequestOptions,
        query: Option<&Query>,
        body: Option<RequestBody>,
    ) -> Result<Decoded> {
        self.request(RelativePath::empty(), options, query, body).await
    }

    async fn execute(&self, seq: u64, request: HttpRequest) -> Result<Decoded> {
        self.observer.on_request(seq, &request);
        let response = self.transport.send(&request).await?;
        let decoded = decode_response(&request.path, response)?;
        let decoded = unwrap_service_error(decoded)?;
        self.observer.on_response(seq, &decoded);
        Ok(decoded)
    }

    /// Configured credentials followed by the caller's parameters.
    pub(crate) fn credentials_query(&self, query: Option<Query>) -> Query {
        Query::new()
            .with("username", self.config.username.as_str())
            .with("password", self.config.password.as_str())
            .merge(query.unwrap_or_default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::observe::NoopObserver;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requests and replays a canned response.
    pub(crate) struct FakeTransport {
        sent: Mutex<Vec<HttpRequest>>,
        response: std::result::Result<HttpResponse, String>,
    }

    impl FakeTransport {
        pub(crate) fn xml(body: &str) -> Self {
            Self::replying("application/xml", body.as_bytes())
        }

        pub(crate) fn replying(content_type: &str, body: &[u8]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                response: Ok(HttpResponse {
                    status: 200,
                    headers: vec![("content-type".to_string(), content_type.to_string())],
                    body: body.to_vec(),
                }),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                response: Err(message.to_string()),
            }
        }

        pub(crate) fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.sent.lock().unwrap().push(request.clone());
            self.response.clone().map_err(ApiError::Transport)
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        requests: Mutex<Vec<u64>>,
        responses: Mutex<Vec<u64>>,
    }

    impl RequestObserver for CountingObserver {
        fn on_request(&self, seq: u64, _request: &HttpRequest) {
            self.requests.lock().unwrap().push(seq);
        }

        fn on_response(&self, seq: u64, _decoded: &Decoded) {
            self.responses.lock().unwrap().push(seq);
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn request_decodes_xml_and_sends_built_descriptor() {
        let client = GoCanvas::with_transport(
            &ConfigOverrides::default(),
            FakeTransport::xml("<CanvasResult><Total>2</Total></CanvasResult>"),
        );
        let query = Query::new().with("page", "1");
        let decoded = block_on(client.request(["forms.xml"], RequestOptions::default(), Some(&query), None))
            .unwrap();
        assert_eq!(decoded, Decoded::Xml(serde_json::json!({"Total": "2"})));

        let sent = client.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].path, "/apiv2/forms.xml?page=1");
    }

    #[test]
    fn request_root_uses_base_path() {
        let client = GoCanvas::with_transport(&ConfigOverrides::default(), FakeTransport::xml("<R/>"));
        block_on(client.request_root(RequestOptions::default(), None, None)).unwrap();
        assert_eq!(client.transport().sent()[0].path, "/apiv2/");
    }

    #[test]
    fn service_error_replaces_the_decoded_value() {
        let client = GoCanvas::with_transport(
            &ConfigOverrides::default(),
            FakeTransport::xml(
                "<CanvasResult><Error><Description>Invalid credentials</Description><ErrorCode>401</ErrorCode></Error></CanvasResult>",
            ),
        );
        let err = block_on(client.request("forms.xml", RequestOptions::default(), None, None)).unwrap_err();
        match err {
            ApiError::Service { description, code } => {
                assert_eq!(description, "Invalid credentials");
                assert_eq!(code, "401");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_propagates() {
        let client = GoCanvas::with_transport(&ConfigOverrides::default(), FakeTransport::failing("refused"));
        let err = block_on(client.request("forms.xml", RequestOptions::default(), None, None)).unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref msg) if msg == "refused"));
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let client = GoCanvas::with_transport(&ConfigOverrides::default(), FakeTransport::xml("<CanvasResult>"));
        let err = block_on(client.request("forms.xml", RequestOptions::default(), None, None)).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn observer_sees_increasing_sequence_numbers() {
        let observer = Arc::new(CountingObserver::default());
        let client = GoCanvas::with_transport(&ConfigOverrides::default(), FakeTransport::xml("<R/>"))
            .with_observer(observer.clone());
        for _ in 0..3 {
            block_on(client.request("forms.xml", RequestOptions::default(), None, None)).unwrap();
        }
        assert_eq!(*observer.requests.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(*observer.responses.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn observer_skips_response_hook_on_failure() {
        let observer = Arc::new(CountingObserver::default());
        let client = GoCanvas::with_transport(&ConfigOverrides::default(), FakeTransport::failing("down"))
            .with_observer(observer.clone());
        assert!(block_on(client.request("forms.xml", RequestOptions::default(), None, None)).is_err());
        assert_eq!(observer.requests.lock().unwrap().len(), 1);
        assert!(observer.responses.lock().unwrap().is_empty());
    }

    #[test]
    fn noop_observer_leaves_calls_unchanged() {
        let client = GoCanvas::with_transport(
            &ConfigOverrides::default(),
            FakeTransport::xml("<CanvasResult><Total>1</Total></CanvasResult>"),
        )
        .with_observer(Arc::new(NoopObserver));
        let segments: &[&str] = &["reference_datas", "12"];
        let decoded = block_on(client.request(segments, RequestOptions::default(), None, None)).unwrap();
        assert_eq!(decoded, Decoded::Xml(serde_json::json!({"Total": "1"})));
        assert_eq!(client.transport().sent()[0].path, "/apiv2/reference_datas/12");
    }

    #[test]
    fn credentials_come_first_and_caller_keys_win() {
        let client = GoCanvas::with_transport(
            &ConfigOverrides::credentials("user", "pass"),
            FakeTransport::xml("<R/>"),
        );
        let query = client.credentials_query(Some(Query::new().with("password", "other").with("page", "3")));
        assert_eq!(query.encode().unwrap(), "username=user&password=other&page=3");
    }
}
