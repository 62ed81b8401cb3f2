//! One method per GoCanvas API capability.
//!
//! Every method sends the configured credentials as `username`/`password`
//! query parameters, followed by whatever the caller passes; caller keys
//! win on conflict.

use crate::client::GoCanvas;
use crate::decode::Decoded;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, RequestBody};
use crate::reference_data::ReferenceData;
use crate::request::{Query, RequestOptions};
use crate::transport::Transport;

impl<T: Transport> GoCanvas<T> {
    /// `GET forms.xml`
    pub async fn get_forms(&self, query: Option<Query>) -> Result<Decoded> {
        let query = self.credentials_query(query);
        self.request("forms.xml", RequestOptions::method(HttpMethod::Get), Some(&query), None)
            .await
    }

    /// `GET submissions.xml`
    pub async fn get_submissions(&self, query: Option<Query>) -> Result<Decoded> {
        let query = self.credentials_query(query);
        self.request("submissions.xml", RequestOptions::method(HttpMethod::Get), Some(&query), None)
            .await
    }

    /// `GET images.xml`. The image comes back as `Decoded::Raw`.
    pub async fn get_images(&self, query: Option<Query>) -> Result<Decoded> {
        let query = self.credentials_query(query);
        self.request("images.xml", RequestOptions::method(HttpMethod::Get), Some(&query), None)
            .await
    }

    /// `POST reference_datas` with the list rendered as XML.
    ///
    /// Nothing is sent if the document cannot be rendered.
    pub async fn post_reference_data(&self, data: &ReferenceData, query: Option<Query>) -> Result<Decoded> {
        let body = data.to_xml(&self.config().options.encoding)?;
        let query = self.credentials_query(query);
        let options = RequestOptions::method(HttpMethod::Post).header("Content-Type", "application/xml");
        self.request("reference_datas", options, Some(&query), Some(RequestBody::Text(body)))
            .await
    }

    /// `POST csv` with a caller-provided payload.
    pub async fn post_csv_meta_data(&self, body: Option<RequestBody>, query: Option<Query>) -> Result<Decoded> {
        let query = self.credentials_query(query);
        self.request("csv", RequestOptions::method(HttpMethod::Post), Some(&query), body)
            .await
    }

    /// `GET csv.xml`
    pub async fn get_csv(&self, query: Option<Query>) -> Result<Decoded> {
        let query = self.credentials_query(query);
        self.request("csv.xml", RequestOptions::method(HttpMethod::Get), Some(&query), None)
            .await
    }

    /// Dispatch items are not supported; always fails without any I/O.
    pub async fn post_dispatch_items(&self, _body: Option<RequestBody>, _query: Option<Query>) -> Result<Decoded> {
        Err(ApiError::NotImplemented("post_dispatch_items"))
    }

    /// Departments are not supported; always fails without any I/O.
    pub async fn get_departments(&self, _query: Option<Query>) -> Result<Decoded> {
        Err(ApiError::NotImplemented("get_departments"))
    }
}
