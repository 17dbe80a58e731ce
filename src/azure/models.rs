//! Wire data model for the Azure DevOps test APIs.
//!
//! The serialized shapes mirror the REST schema (camelCase keys, optional
//! fields omitted when unset); the in-memory registry reuses the same
//! structs so there is exactly one representation of a result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a test case or step, as Azure DevOps expects it on the wire.
///
/// The service accepts a wider set of values; automation only ever reports
/// these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Passed,
    Failed,
    Blocked,
    NotExecuted,
}

impl Outcome {
    /// Returns the wire representation of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Blocked => "blocked",
            Outcome::NotExecuted => "notExecuted",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry for one configured test case.
///
/// The point id is assigned once during point resolution and never changes
/// for the rest of the session; the result is assigned when the run's
/// result list is fetched.
#[derive(Debug, Clone, Default)]
pub struct TestCaseInfo {
    pub point_id: Option<i64>,
    pub result: Option<TestResultData>,
}

/// A test result inside a run, cached locally and pushed back on update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResultData {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub iteration_details: Vec<IterationDetail>,
}

/// One execution attempt of a test case. This system always uses exactly
/// one iteration per case, seeded from the remote run's timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IterationDetail {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    pub action_results: Vec<ActionResult>,
}

/// Outcome of a single test step within an iteration. Appended in call
/// order; the list is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub action_path: String,
    pub iteration_id: i64,
    pub step_identifier: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

/// One attachment upload payload: base64 content plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub stream: String,
    pub file_name: String,
    pub comment: String,
    pub attachment_type: String,
}

/// Converts a 1-based step index into the 8-digit zero-padded action path
/// Azure uses to address a step inside an iteration.
///
/// # Examples
///
/// ```
/// use azure_testops::azure::models::step_to_action_path;
///
/// assert_eq!(step_to_action_path(0), "00000001");
/// assert_eq!(step_to_action_path(99), "00000100");
/// ```
pub fn step_to_action_path(step: usize) -> String {
    format!("{:08}", step + 1)
}

// Response shapes for the endpoints the client consumes. Only the fields
// the client reads are declared; the rest of the payload is ignored.

/// A page of test points.
#[derive(Debug, Deserialize)]
pub(crate) struct PointsPage {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub value: Vec<PointRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PointRef {
    pub id: i64,
}

/// The run-creation response.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedRun {
    pub id: i64,
}

/// A page of run results.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsPage {
    #[serde(default)]
    pub value: Vec<RunResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunResult {
    pub id: i64,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub started_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    pub test_case: TestCaseRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TestCaseRef {
    pub id: String,
}
