//! Generic JSON API request helper.
//!
//! A single fail-fast primitive used by the orchestration client: serialize
//! the body to JSON if present, issue the request, fail on non-2xx with the
//! URL, status, and response text embedded in the error, and return the
//! decoded JSON body on success.

use crate::api::ApiError;
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;

/// A JSON request description for [`api_request`].
#[derive(Debug, Clone)]
pub struct JsonRequest {
    pub method: Method,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl JsonRequest {
    /// Creates a request with the given method and no headers or body.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Replaces the header map.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Issues a JSON request and returns the decoded response body.
///
/// Any non-2xx response fails with [`ApiError::Status`] carrying the URL,
/// the status code, and the raw response text. The body is sent as raw
/// serialized JSON so the caller's `Content-Type` header is authoritative
/// (the work-item patch endpoint requires `application/json-patch+json`).
pub async fn api_request(client: &Client, url: &str, request: JsonRequest) -> Result<Value, ApiError> {
    let mut builder = client.request(request.method, url);

    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if let Some(body) = &request.body {
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Json(e.to_string()))?;
        builder = builder.body(bytes);
    }

    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::Json(e.to_string()))
}
