//! In-process stand-in for the GoCanvas `/apiv2` endpoints.
//!
//! Every endpoint checks the `username`/`password` query parameters and,
//! like the real service, reports failures as an `<Error>` envelope inside
//! an HTTP 200 response. Uploads are recorded so tests can inspect exactly
//! what a client sent. The images endpoint reproduces the service quirk of
//! labelling binary data as `application/xml`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};

pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// A tiny PNG signature followed by filler; enough to prove bytes pass
/// through untouched.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR<CanvasResult>";

pub const FORMS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<CanvasResult>
  <Forms>
    <Form Id="1001">
      <Name>Daily Inspection</Name>
      <Status>Published</Status>
      <Version>3</Version>
    </Form>
    <Form Id="1002">
      <Name>Incident Report</Name>
      <Status>Published</Status>
      <Version>1</Version>
    </Form>
  </Forms>
</CanvasResult>"#;

pub const CSV_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<CanvasResult>
  <Csv>
    <Header>Site,Inspector</Header>
    <Line>Oslo,Ada</Line>
  </Csv>
</CanvasResult>"#;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub endpoint: &'static str,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug)]
pub struct MockState {
    pub username: String,
    pub password: String,
    pub uploads: Vec<Upload>,
}

pub type Db = Arc<RwLock<MockState>>;

pub fn state(username: &str, password: &str) -> Db {
    Arc::new(RwLock::new(MockState {
        username: username.to_string(),
        password: password.to_string(),
        uploads: Vec::new(),
    }))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/apiv2/forms.xml", get(get_forms))
        .route("/apiv2/submissions.xml", get(get_submissions))
        .route("/apiv2/images.xml", get(get_images))
        .route("/apiv2/reference_datas", post(post_reference_data))
        .route("/apiv2/csv", post(post_csv))
        .route("/apiv2/csv.xml", get(get_csv))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

/// Query parameters understood by the endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub form_id: Option<String>,
    pub image_id: Option<String>,
}

pub fn error_envelope(description: &str, code: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><CanvasResult><Error><Description>{description}</Description><ErrorCode>{code}</ErrorCode></Error></CanvasResult>"#
    )
}

fn xml(body: impl Into<String>) -> Response {
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body.into()).into_response()
}

async fn authorize(db: &Db, params: &ApiParams) -> Result<(), Response> {
    let state = db.read().await;
    if params.username == state.username && params.password == state.password {
        Ok(())
    } else {
        tracing::warn!(username = %params.username, "rejected credentials");
        Err(xml(error_envelope("Invalid credentials", "401")))
    }
}

async fn get_forms(State(db): State<Db>, Query(params): Query<ApiParams>) -> Response {
    if let Err(rejection) = authorize(&db, &params).await {
        return rejection;
    }
    xml(FORMS_XML)
}

async fn get_submissions(State(db): State<Db>, Query(params): Query<ApiParams>) -> Response {
    if let Err(rejection) = authorize(&db, &params).await {
        return rejection;
    }
    let Some(form_id) = params.form_id.as_deref() else {
        return xml(error_envelope("Form ID is required", "400"));
    };
    xml(format!(
        r#"<?xml version="1.0" encoding="utf-8"?><CanvasResult><Submissions><Submission Id="1"><FormId>{form_id}</FormId><Responses><Response><Label>Site</Label><Value>Oslo</Value></Response><Response><Label>Notes</Label><Value/></Response></Responses></Submission></Submissions></CanvasResult>"#
    ))
}

async fn get_images(State(db): State<Db>, Query(params): Query<ApiParams>) -> Response {
    if let Err(rejection) = authorize(&db, &params).await {
        return rejection;
    }
    if params.image_id.is_none() {
        return xml(error_envelope("Image ID is required", "400"));
    }
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], IMAGE_BYTES).into_response()
}

async fn post_reference_data(
    State(db): State<Db>,
    Query(params): Query<ApiParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(rejection) = authorize(&db, &params).await {
        return rejection;
    }
    let content_type = content_type(&headers);
    if !content_type.as_deref().is_some_and(|ct| ct.contains("application/xml")) {
        return xml(error_envelope("Reference data must be XML", "415"));
    }
    record(&db, "reference_datas", content_type, &body).await;
    xml(r#"<?xml version="1.0" encoding="utf-8"?><CanvasResult><Success>Reference data saved</Success></CanvasResult>"#)
}

async fn post_csv(
    State(db): State<Db>,
    Query(params): Query<ApiParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(rejection) = authorize(&db, &params).await {
        return rejection;
    }
    record(&db, "csv", content_type(&headers), &body).await;
    xml(r#"<?xml version="1.0" encoding="utf-8"?><CanvasResult><Success>CSV settings saved</Success></CanvasResult>"#)
}

async fn get_csv(State(db): State<Db>, Query(params): Query<ApiParams>) -> Response {
    if let Err(rejection) = authorize(&db, &params).await {
        return rejection;
    }
    xml(CSV_XML)
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn record(db: &Db, endpoint: &'static str, content_type: Option<String>, body: &Bytes) {
    let upload = Upload {
        endpoint,
        content_type,
        body: String::from_utf8_lossy(body).into_owned(),
    };
    tracing::info!(endpoint, bytes = body.len(), "upload received");
    db.write().await.uploads.push(upload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_has_description_and_code() {
        let body = error_envelope("Invalid credentials", "401");
        assert!(body.contains("<Description>Invalid credentials</Description>"));
        assert!(body.contains("<ErrorCode>401</ErrorCode>"));
        assert!(body.starts_with("<?xml"));
    }

    #[test]
    fn content_type_reads_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_type(&headers), None);
        headers.insert(header::CONTENT_TYPE, "application/xml".parse().unwrap());
        assert_eq!(content_type(&headers).as_deref(), Some("application/xml"));
    }

    #[tokio::test]
    async fn authorize_compares_both_fields() {
        let db = state("u", "p");
        let mut params = ApiParams {
            username: "u".to_string(),
            ..ApiParams::default()
        };
        assert!(authorize(&db, &params).await.is_err());
        params.password = "p".to_string();
        assert!(authorize(&db, &params).await.is_ok());
    }
}
