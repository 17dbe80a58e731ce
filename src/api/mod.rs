//! Thin HTTP verb wrappers with uniform status handling.
//!
//! Each wrapper issues a single request through a shared [`reqwest::Client`],
//! checks the status line, and either returns the raw response or fails with
//! the status code and response body text. No retries; the caller decides
//! whether a failed call is worth repeating.

pub mod error;
pub mod request;

pub use error::ApiError;
pub use request::{api_request, JsonRequest};

use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::collections::HashMap;

/// Options bag for the verb wrappers.
///
/// All fields are optional; `form` and `json` are mutually exclusive in
/// practice (a request carries at most one body).
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    /// Form-encoded body.
    pub form: Option<HashMap<String, String>>,
    /// JSON body.
    pub json: Option<Value>,
}

/// Sends an HTTP GET request and checks the response status.
pub async fn do_get(client: &Client, resource: &str, options: RequestOptions) -> Result<Response, ApiError> {
    send(client, Method::GET, resource, options).await
}

/// Sends an HTTP POST request and checks the response status.
pub async fn do_post(client: &Client, resource: &str, options: RequestOptions) -> Result<Response, ApiError> {
    send(client, Method::POST, resource, options).await
}

/// Sends an HTTP PUT request and checks the response status.
pub async fn do_put(client: &Client, resource: &str, options: RequestOptions) -> Result<Response, ApiError> {
    send(client, Method::PUT, resource, options).await
}

/// Sends an HTTP PATCH request and checks the response status.
pub async fn do_patch(client: &Client, resource: &str, options: RequestOptions) -> Result<Response, ApiError> {
    send(client, Method::PATCH, resource, options).await
}

/// Sends an HTTP DELETE request and checks the response status.
pub async fn do_delete(client: &Client, resource: &str, options: RequestOptions) -> Result<Response, ApiError> {
    send(client, Method::DELETE, resource, options).await
}

/// Builds and sends a single request, then runs the shared status check.
async fn send(
    client: &Client,
    method: Method,
    resource: &str,
    options: RequestOptions,
) -> Result<Response, ApiError> {
    let mut builder = client.request(method, resource);

    for (name, value) in &options.headers {
        builder = builder.header(name, value);
    }
    if let Some(form) = &options.form {
        builder = builder.form(form);
    }
    if let Some(json) = &options.json {
        builder = builder.json(json);
    }

    let response = builder.send().await?;
    check_status(resource, response).await
}

/// Checks that the status code is 2xx, otherwise fails with the status code
/// and the response body text.
async fn check_status(resource: &str, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            url: resource.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    log::info!("HTTP Status: {}", status.as_u16());
    Ok(response)
}
