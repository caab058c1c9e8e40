use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Serialize;
use shared::protocol::{Method, API_BASE_PATH};
use tracing::debug;
use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, TransportError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self {
            status,
            content_length: Some(body.len() as u64),
            body,
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn no_content() -> Self {
        Self::new(204, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 204, an explicit zero content length, or nothing to decode.
    pub fn is_empty_ack(&self) -> bool {
        self.status == 204
            || self.content_length == Some(0)
            || self.body.iter().all(u8::is_ascii_whitespace)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest` transport rooted at `<server_url>/api`. No timeout beyond the
/// client default is applied.
pub struct ReqwestTransport {
    http: Client,
    api_root: Url,
}

impl ReqwestTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, TransportError> {
        let server_url = server_url.trim_end_matches('/');
        let api_root = Url::parse(&format!("{server_url}{API_BASE_PATH}"))?;
        Ok(Self { http, api_root })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.api_root.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };
        let mut builder = self.http.request(method, self.url_for(&request.path));
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let status: StatusCode = response.status();
        let content_length = response.content_length();
        let body = response.bytes().await?.to_vec();
        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            bytes = body.len(),
            "service responded"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            content_length,
            body,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
