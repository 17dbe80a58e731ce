//! Test-automation helpers for Azure DevOps Test Plans.
//!
//! This crate is the reporting layer of a browser-automation test harness:
//! it publishes automated run results to the Azure DevOps test APIs and
//! keeps a human-readable assertion trail on disk.
//!
//! # Architecture
//!
//! - **api**: HTTP verb wrappers and the generic JSON request helper, all
//!   single-attempt and fail-fast
//! - **auth**: HTTP Basic encoding and the PAT authorization header
//! - **config**: explicit session configuration, optionally read from the
//!   environment
//! - **azure**: the test-run orchestration client and its wire data model
//! - **fsutil**: directory creation, base64 file encoding, file listing
//! - **logging**: `env_logger` setup and the append-only assertion log
//! - **assertions**: log-then-check helpers over the [`assertions::UiElement`]
//!   seam
//! - **db**: session-scoped MongoDB and PostgreSQL connection helpers
//!
//! # Session flow
//!
//! A harness drives one [`TestRunClient`] per test session:
//!
//! 1. [`TestRunClient::create_test_run`] at session start: resolves test
//!    points, creates the remote run, seeds one result record per case;
//! 2. [`TestRunClient::update_test_step_result`] after each test step;
//! 3. [`TestRunClient::update_test_case_result`] after each test case:
//!    pushes the result, uploads the case's artifacts, moves the work item's
//!    backlog state;
//! 4. [`TestRunClient::update_test_run_result`] at session end: marks the
//!    run completed and bulk-uploads the accumulated attachments.
//!
//! Remote failures are never retried or swallowed: the session fails loudly
//! with the status code and response text in the error message.

pub mod api;
pub mod assertions;
pub mod auth;
pub mod azure;
pub mod config;
pub mod db;
pub mod fsutil;
pub mod logging;

pub use api::{api_request, do_delete, do_get, do_patch, do_post, do_put};
pub use api::{ApiError, JsonRequest, RequestOptions};
pub use assertions::{
    input_value_assertion, json_assertion, literal_values_assertion, locator_text_assertion,
    AssertionError, UiElement,
};
pub use azure::{Attachment, AzureError, Outcome, TestRunClient};
pub use config::{AzureConfig, ConfigError, DbConfig};
pub use db::{
    close_mongodb_connection, close_postgres_connection, connect_to_mongodb, connect_to_postgres,
    DbError,
};
pub use logging::AssertionLogger;
