//! Asynchronous client for the GoCanvas forms API.
//!
//! # Overview
//! Builds requests against the `/apiv2` REST endpoint, authenticates with
//! query-string credentials, and turns the XML answers into
//! `serde_json::Value` trees. Image downloads come back as raw bytes.
//!
//! # Design
//! - Building (`request`) and decoding (`decode`, `envelope`) are pure and
//!   testable without a network; `transport` is the only I/O boundary.
//! - `GoCanvas` is generic over its `Transport`, defaulting to reqwest.
//! - Configuration is a complete `ClientConfig` produced by merging
//!   caller `ConfigOverrides` onto fixed defaults.
//! - API failures reported in-band (`<Error>` envelopes) surface as
//!   `ApiError::Service`, distinct from transport and parse failures.
//!
//! ```no_run
//! use gocanvas_core::{ConfigOverrides, GoCanvas, Query};
//!
//! # async fn run() -> gocanvas_core::Result<()> {
//! let client = GoCanvas::new(&ConfigOverrides::credentials("me@example.com", "secret"))?;
//! let forms = client.get_forms(None).await?;
//! let submissions = client
//!     .get_submissions(Some(Query::new().with("form_id", "1234")))
//!     .await?;
//! # let _ = (forms, submissions);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod decode;
pub mod envelope;
pub mod error;
pub mod http;
pub mod observe;
pub mod reference_data;
pub mod request;
pub mod transport;

pub use client::GoCanvas;
pub use config::{ClientConfig, ConfigOverrides};
pub use decode::Decoded;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use observe::{NoopObserver, RequestObserver, TracingObserver};
pub use reference_data::ReferenceData;
pub use request::{Query, RelativePath, RequestOptions};
pub use transport::{HttpTransport, Transport};
