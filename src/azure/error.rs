//! Orchestration client error types.
//!
//! The client distinguishes transport failures (surfaced by the API layer)
//! from desync failures, where the local registry is missing an entry the
//! operation requires. Desync errors signal an ordering violation (an update
//! before run creation) or a remote/local state mismatch, and are always
//! fatal to the session.

use crate::api::ApiError;
use crate::config::ConfigError;
use std::fmt;

/// Errors produced by [`crate::azure::TestRunClient`].
#[derive(Debug)]
pub enum AzureError {
    /// A remote call failed; the inner error carries URL, status, and body.
    Api(ApiError),

    /// The points lookup found no test point for a configured test case.
    ///
    /// Usually means the test case is not in the targeted plan/suite.
    MissingPoint { test_case: String },

    /// No result record is assigned to the test case yet.
    MissingResult { test_case: String },

    /// The test case's result has no iteration to attach step outcomes to.
    MissingIteration { test_case: String },

    /// The remote run reported a result for a test case this session does
    /// not track.
    UntrackedResult { test_case: String },

    /// An operation that requires a created run was called before
    /// `create_test_run`.
    RunNotCreated,

    /// A response decoded as JSON but did not have the expected shape.
    Malformed(String),

    /// Filesystem failure while collecting attachments.
    Io(std::io::Error),

    /// The session configuration failed validation.
    Config(ConfigError),
}

impl fmt::Display for AzureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AzureError::Api(err) => write!(f, "{}", err),
            AzureError::MissingPoint { test_case } => {
                write!(f, "No test point found for test case {}", test_case)
            }
            AzureError::MissingResult { test_case } => {
                write!(f, "Test case data for ID {} does not exist", test_case)
            }
            AzureError::MissingIteration { test_case } => {
                write!(f, "Iteration data for ID {} does not exist", test_case)
            }
            AzureError::UntrackedResult { test_case } => write!(
                f,
                "Run reported a result for untracked test case {}",
                test_case
            ),
            AzureError::RunNotCreated => write!(f, "Test run has not been created yet"),
            AzureError::Malformed(msg) => write!(f, "Unexpected response shape: {}", msg),
            AzureError::Io(err) => write!(f, "Filesystem error: {}", err),
            AzureError::Config(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AzureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AzureError::Api(err) => Some(err),
            AzureError::Io(err) => Some(err),
            AzureError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for AzureError {
    fn from(err: ApiError) -> Self {
        AzureError::Api(err)
    }
}

impl From<std::io::Error> for AzureError {
    fn from(err: std::io::Error) -> Self {
        AzureError::Io(err)
    }
}

impl From<ConfigError> for AzureError {
    fn from(err: ConfigError) -> Self {
        AzureError::Config(err)
    }
}
