//! HTTP Basic authentication helpers.
//!
//! Azure DevOps accepts a personal access token over HTTP Basic with an
//! empty username, so the crate only needs RFC 7617 encoding plus the
//! PAT-specific header builder.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encodes username and password into a Basic authentication header value.
///
/// # Examples
///
/// ```
/// use azure_testops::auth::basic_auth;
///
/// let header = basic_auth("user", "pass123");
/// assert_eq!(header, "Basic dXNlcjpwYXNzMTIz");
/// ```
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Builds the Authorization header for an Azure DevOps personal access
/// token: Basic auth with an empty username and the token as password.
pub fn pat_auth_header(pat: &str) -> String {
    basic_auth("", pat)
}
