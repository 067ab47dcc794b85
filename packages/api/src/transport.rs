//! # HTTP transport seam
//!
//! Every request the client makes is described by an [`HttpRequest`] and
//! executed by an [`HttpTransport`]. The production implementation,
//! [`ReqwestTransport`], prefixes paths with the configured base URL and
//! attaches the bearer credential; tests swap in the in-memory backend from
//! `crate::testing`.
//!
//! A transport only reports whether a response arrived. Status codes are
//! classified one layer up, in [`crate::ApiError::from_response`].

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A request relative to the API base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `/blogs/3`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::validation(format!("Unserialisable payload: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Look up a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json<B: Serialize>(status: u16, body: &B) -> Self {
        Self::new(status, serde_json::to_vec(body).unwrap_or_default())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response arrived.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportFailure(pub String);

impl From<TransportFailure> for ApiError {
    fn from(failure: TransportFailure) -> Self {
        ApiError::transport(failure.0)
    }
}

/// Async trait for executing requests.
pub trait HttpTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, TransportFailure>>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` (e.g. `http://localhost:8080/api`).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        let client = builder
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl ReqwestTransport {
    /// Translate a request into its wire form: absolute URL with query,
    /// `Authorization: Bearer` when a token is present, JSON body.
    pub fn build(&self, request: &HttpRequest) -> Result<reqwest::Request, TransportFailure> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, self.url_for(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder
            .build()
            .map_err(|e| TransportFailure(format!("Invalid request: {e}")))
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let request = self.build(&request)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TransportFailure(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure(e.to_string()))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_keeps_base_path() {
        let transport = ReqwestTransport::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080/api");
        assert_eq!(
            transport.url_for("/blogs/3"),
            "http://localhost:8080/api/blogs/3"
        );
        assert_eq!(
            transport.url_for("members/login"),
            "http://localhost:8080/api/members/login"
        );
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("/blogs")
            .query("page", 0)
            .query("size", 10)
            .bearer(Some("tok".to_string()));
        assert_eq!(request.method.as_str(), "GET");
        assert_eq!(request.query_param("page"), Some("0"));
        assert_eq!(request.query_param("size"), Some("10"));
        assert_eq!(request.bearer.as_deref(), Some("tok"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_failure() {
        // Port 9 (discard) on localhost is closed on test machines.
        let transport =
            ReqwestTransport::new("http://127.0.0.1:9/api", Some(Duration::from_secs(2))).unwrap();
        let result = transport.send(HttpRequest::get("/blogs")).await;
        let err: ApiError = result.unwrap_err().into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_signed_in_put_carries_bearer_and_json() {
        let transport = ReqwestTransport::new("http://localhost:8080/api", None).unwrap();
        let request = HttpRequest::put("/blogs/3")
            .bearer(Some("jwt-123".to_string()))
            .json(&serde_json::json!({"title": "T", "content": "C"}))
            .unwrap();

        let built = transport.build(&request).unwrap();
        assert_eq!(built.method(), &reqwest::Method::PUT);
        assert_eq!(built.url().as_str(), "http://localhost:8080/api/blogs/3");
        assert_eq!(
            built.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer jwt-123"
        );
        assert_eq!(
            built.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value =
            serde_json::from_slice(built.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "T", "content": "C"}));
    }

    #[test]
    fn test_anonymous_get_has_query_and_no_authorization() {
        let transport = ReqwestTransport::new("http://localhost:8080/api", None).unwrap();
        let request = HttpRequest::get("/blogs/member/4")
            .query("page", 2)
            .query("size", 10)
            .bearer(None);

        let built = transport.build(&request).unwrap();
        assert_eq!(built.method(), &reqwest::Method::GET);
        assert_eq!(
            built.url().as_str(),
            "http://localhost:8080/api/blogs/member/4?page=2&size=10"
        );
        assert!(built.headers().get(reqwest::header::AUTHORIZATION).is_none());
        assert!(built.body().is_none());
    }
}
