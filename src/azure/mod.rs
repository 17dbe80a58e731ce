//! Test-run orchestration against the Azure DevOps test APIs.
//!
//! [`TestRunClient`] drives one remote test run per test session:
//!
//! 1. `create_test_run` resolves the test points for the configured cases,
//!    creates the run, and seeds one result record per case from the run's
//!    result list;
//! 2. `update_test_step_result` appends step outcomes to the cached result
//!    as the session progresses;
//! 3. `update_test_case_result` pushes the finished result to the service,
//!    uploads the case's artifacts, and patches the work-item backlog state;
//! 4. `update_test_run_result` marks the run completed and bulk-uploads the
//!    attachments accumulated across the session.
//!
//! Every remote call is single-attempt and fail-fast: a non-2xx response or
//! a registry mismatch aborts the enclosing operation with a descriptive
//! error, and no partial registry mutation from the failed call is kept.

pub mod error;
pub mod models;

pub use error::AzureError;
pub use models::{ActionResult, Attachment, IterationDetail, Outcome, TestCaseInfo, TestResultData};

use crate::api::{api_request, JsonRequest};
use crate::auth::pat_auth_header;
use crate::config::AzureConfig;
use crate::fsutil;
use futures::future;
use models::{step_to_action_path, CreatedRun, PointsPage, ResultsPage};
use reqwest::Method;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

const API_VERSION_POINTS: &str = "7.1-preview.2";
const API_VERSION_RUNS: &str = "7.1-preview.2";
const API_VERSION_RESULTS: &str = "7.1-preview.6";
const API_VERSION_RUN_UPDATE: &str = "7.1-preview.3";
const API_VERSION_ATTACHMENTS: &str = "7.1-preview.1";
const API_VERSION_WORK_ITEMS: &str = "7.1-preview.3";

const RESULTS_PAGE_SIZE: usize = 100;

const RUN_NAME: &str = "Automated test run";
const RESULT_COMMENT: &str = "Automated test run result";
const RUN_FINISHED_COMMENT: &str = "Automated test run finished";
const ATTACHMENT_COMMENT: &str = "Test automation attachment";
const ATTACHMENT_TYPE: &str = "GeneralAttachment";
const STATE_COMPLETED: &str = "Completed";

const BACKLOG_STATE_READY: &str = "Ready";
const BACKLOG_STATE_DESIGN: &str = "Design";
const HISTORY_PASSED: &str = "Automated execution finished successfully";
const HISTORY_FAILED: &str = "Automated execution failed for this test case";

/// Orchestration client for one test-run session.
///
/// One instance owns the registry for one session; nothing is shared
/// between instances, so parallel test workers each construct their own.
pub struct TestRunClient {
    config: AzureConfig,
    http: reqwest::Client,
    api_root: String,
    auth_header: String,
    run_id: Option<i64>,
    registry: HashMap<String, TestCaseInfo>,
    run_attachments: Vec<Attachment>,
}

impl TestRunClient {
    /// Creates a client for the given session configuration.
    ///
    /// Fails if the configuration does not validate (empty or duplicated
    /// test-case selection, unparseable base URL).
    pub fn new(config: AzureConfig) -> Result<Self, AzureError> {
        config.validate()?;
        let api_root = format!(
            "{}/{}/{}/_apis",
            config.base_url.trim_end_matches('/'),
            config.organization,
            config.project
        );
        let auth_header = pat_auth_header(&config.pat);
        Ok(Self {
            config,
            http: reqwest::Client::new(),
            api_root,
            auth_header,
            run_id: None,
            registry: HashMap::new(),
            run_attachments: Vec::new(),
        })
    }

    /// The remote run id, once `create_test_run` has succeeded.
    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    /// The resolved point id for a test case, if any.
    pub fn point_id(&self, test_case: &str) -> Option<i64> {
        self.registry.get(test_case).and_then(|info| info.point_id)
    }

    /// The cached result record for a test case, if assigned.
    pub fn result(&self, test_case: &str) -> Option<&TestResultData> {
        self.registry
            .get(test_case)
            .and_then(|info| info.result.as_ref())
    }

    /// All attachments accumulated across the session so far.
    pub fn run_attachments(&self) -> &[Attachment] {
        &self.run_attachments
    }

    /// Creates the remote test run and seeds the local registry.
    ///
    /// Resolves the test points for every configured test case, submits the
    /// run-creation request, then fetches the run's result list and assigns
    /// one result record (with a single seeded iteration) per test case.
    /// Returns the remote run id.
    pub async fn create_test_run(&mut self) -> Result<i64, AzureError> {
        self.resolve_points().await?;

        let point_ids: Vec<i64> = self
            .config
            .test_cases
            .iter()
            .filter_map(|id| self.point_id(id))
            .collect();

        let url = format!("{}/test/runs?api-version={}", self.api_root, API_VERSION_RUNS);
        let request = JsonRequest::new(Method::POST)
            .headers(self.json_headers())
            .body(json!({
                "name": RUN_NAME,
                "plan": {"id": self.config.plan_id.to_string()},
                "pointIds": point_ids,
            }));
        let body = api_request(&self.http, &url, request).await?;

        let run: CreatedRun = serde_json::from_value(body)
            .map_err(|e| AzureError::Malformed(format!("run creation response: {}", e)))?;
        self.run_id = Some(run.id);
        log::info!("Test run {} successfully created", run.id);

        self.assign_results_from_run().await?;
        Ok(run.id)
    }

    /// Pushes a finished test-case result to the service.
    ///
    /// Marks the cached result "Completed" with the given outcome (iteration
    /// included), PATCHes it to the run's result list, uploads every regular
    /// file under `artifact_dir` as a result attachment, and finally moves
    /// the work item's backlog state: passed goes to "Ready", anything else
    /// back to "Design". The registry keeps the previous record if the
    /// remote update fails.
    pub async fn update_test_case_result(
        &mut self,
        test_case: &str,
        outcome: Outcome,
        artifact_dir: &Path,
    ) -> Result<(), AzureError> {
        let run_id = self.require_run()?;

        let mut updated = self
            .result(test_case)
            .ok_or_else(|| AzureError::MissingResult {
                test_case: test_case.to_string(),
            })?
            .clone();
        let iteration = updated.iteration_details.first_mut().ok_or_else(|| {
            AzureError::MissingIteration {
                test_case: test_case.to_string(),
            }
        })?;
        iteration.outcome = Some(outcome.as_str().to_string());
        updated.state = Some(STATE_COMPLETED.to_string());
        updated.outcome = Some(outcome.as_str().to_string());

        let url = format!(
            "{}/test/Runs/{}/results?api-version={}",
            self.api_root, run_id, API_VERSION_RESULTS
        );
        let request = JsonRequest::new(Method::PATCH)
            .headers(self.json_headers())
            .body(json!([&updated]));
        api_request(&self.http, &url, request).await?;

        // Commit only after the service accepted the update.
        if let Some(entry) = self.registry.get_mut(test_case) {
            entry.result = Some(updated);
        }

        self.send_test_result_attachments(test_case, artifact_dir)
            .await?;
        self.update_backlog_state(test_case, outcome).await?;
        Ok(())
    }

    /// Appends a step outcome to the test case's iteration.
    ///
    /// `step` is the 1-based index of the step as shown in the test case
    /// design; the action path is derived from it deterministically. Calls
    /// are append-only: repeating an index adds another record rather than
    /// overwriting the earlier one. Fails if the test case has no assigned
    /// result yet, which means run creation has not happened.
    pub fn update_test_step_result(
        &mut self,
        test_case: &str,
        step: usize,
        outcome: Outcome,
    ) -> Result<(), AzureError> {
        let action_path = step_to_action_path(step);
        let result = self
            .registry
            .get_mut(test_case)
            .and_then(|info| info.result.as_mut())
            .ok_or_else(|| AzureError::MissingResult {
                test_case: test_case.to_string(),
            })?;
        let iteration = result.iteration_details.first_mut().ok_or_else(|| {
            AzureError::MissingIteration {
                test_case: test_case.to_string(),
            }
        })?;

        let action = ActionResult {
            action_path,
            iteration_id: iteration.id,
            step_identifier: step.to_string(),
            outcome: outcome.as_str().to_string(),
            started_date: iteration.started_date,
            completed_date: iteration.completed_date,
        };
        iteration.action_results.push(action);
        Ok(())
    }

    /// Marks the remote run "Completed" and bulk-uploads the session's
    /// accumulated attachments as run-level attachments.
    pub async fn update_test_run_result(&mut self) -> Result<(), AzureError> {
        let run_id = self.require_run()?;
        let url = format!(
            "{}/test/runs/{}?api-version={}",
            self.api_root, run_id, API_VERSION_RUN_UPDATE
        );
        let request = JsonRequest::new(Method::PATCH)
            .headers(self.json_headers())
            .body(json!({
                "state": STATE_COMPLETED,
                "comment": RUN_FINISHED_COMMENT,
            }));
        api_request(&self.http, &url, request).await?;
        log::info!("Test run {} marked completed", run_id);

        self.send_test_run_attachments().await
    }

    /// Reads every regular file under `dir` into an attachment payload.
    ///
    /// Filenames are prefixed with the test-case id so run-level bulk
    /// uploads stay attributable. Each attachment is also recorded in the
    /// session-wide accumulator.
    pub fn convert_attachments_to_base64(
        &mut self,
        test_case: &str,
        dir: &Path,
    ) -> Result<Vec<Attachment>, AzureError> {
        let mut attachments = Vec::new();
        for file in fsutil::list_files(dir)? {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let attachment = Attachment {
                stream: fsutil::file_to_base64(&file)?,
                file_name: format!("{} - {}", test_case, name),
                comment: ATTACHMENT_COMMENT.to_string(),
                attachment_type: ATTACHMENT_TYPE.to_string(),
            };
            self.run_attachments.push(attachment.clone());
            attachments.push(attachment);
        }
        Ok(attachments)
    }

    /// Resolves the test point for every configured test case.
    ///
    /// Lookups run concurrently; the registry is only populated once every
    /// lookup has succeeded, so a failed resolution leaves no partial state.
    async fn resolve_points(&mut self) -> Result<(), AzureError> {
        let lookups = self
            .config
            .test_cases
            .iter()
            .map(|test_case| self.lookup_point(test_case));
        let resolved = future::try_join_all(lookups).await?;

        for (test_case, point_id) in resolved {
            self.registry.insert(
                test_case,
                TestCaseInfo {
                    point_id: Some(point_id),
                    result: None,
                },
            );
        }
        Ok(())
    }

    /// Looks up the test point binding one test case to the configured
    /// plan and suite. Zero matches is a hard failure; more than one match
    /// takes the first and warns, since multi-configuration suites can
    /// legitimately map one case to several points.
    async fn lookup_point(&self, test_case: &str) -> Result<(String, i64), AzureError> {
        let url = format!(
            "{}/test/Plans/{}/suites/{}/points?api-version={}&testCaseId={}&$top=1",
            self.api_root, self.config.plan_id, self.config.suite_id, API_VERSION_POINTS, test_case
        );
        let body = api_request(
            &self.http,
            &url,
            JsonRequest::new(Method::GET).headers(self.json_headers()),
        )
        .await?;

        let page: PointsPage = serde_json::from_value(body)
            .map_err(|e| AzureError::Malformed(format!("points response: {}", e)))?;
        match page.value.first() {
            Some(point) => {
                if page.count.unwrap_or(page.value.len()) > 1 {
                    log::warn!(
                        "Test case {} has multiple test points; using point {}",
                        test_case,
                        point.id
                    );
                }
                Ok((test_case.to_string(), point.id))
            }
            None => Err(AzureError::MissingPoint {
                test_case: test_case.to_string(),
            }),
        }
    }

    /// Fetches the run's result list page by page and assigns a result
    /// record (with one seeded iteration) to each tracked test case.
    ///
    /// A result naming a test case the registry does not track means the
    /// remote and local views have diverged, and nothing is committed.
    async fn assign_results_from_run(&mut self) -> Result<(), AzureError> {
        let run_id = self.require_run()?;
        let mut seeded: Vec<(String, TestResultData)> = Vec::new();
        let mut skip = 0usize;

        loop {
            let url = format!(
                "{}/test/Runs/{}/results?detailsToInclude=WorkItems&$top={}&$skip={}&api-version={}",
                self.api_root, run_id, RESULTS_PAGE_SIZE, skip, API_VERSION_RESULTS
            );
            let body = api_request(
                &self.http,
                &url,
                JsonRequest::new(Method::GET).headers(self.json_headers()),
            )
            .await?;

            let page: ResultsPage = serde_json::from_value(body)
                .map_err(|e| AzureError::Malformed(format!("run results response: {}", e)))?;
            let fetched = page.value.len();

            for result in page.value {
                let data = TestResultData {
                    id: result.id,
                    state: result.state,
                    outcome: None,
                    comment: Some(RESULT_COMMENT.to_string()),
                    iteration_details: vec![IterationDetail {
                        id: 1,
                        outcome: None,
                        started_date: result.started_date,
                        completed_date: result.completed_date,
                        action_results: Vec::new(),
                    }],
                };
                seeded.push((result.test_case.id, data));
            }

            if fetched < RESULTS_PAGE_SIZE {
                break;
            }
            skip += fetched;
        }

        for (test_case, _) in &seeded {
            if !self.registry.contains_key(test_case) {
                return Err(AzureError::UntrackedResult {
                    test_case: test_case.clone(),
                });
            }
        }
        for (test_case, data) in seeded {
            if let Some(entry) = self.registry.get_mut(&test_case) {
                entry.result = Some(data);
            }
        }
        Ok(())
    }

    /// Uploads the artifact files of one test case as result attachments.
    /// Uploads are independent, so they fan out concurrently; the first
    /// failure fails the operation.
    async fn send_test_result_attachments(
        &mut self,
        test_case: &str,
        dir: &Path,
    ) -> Result<(), AzureError> {
        let attachments = self.convert_attachments_to_base64(test_case, dir)?;
        let result_id = self
            .result(test_case)
            .ok_or_else(|| AzureError::MissingResult {
                test_case: test_case.to_string(),
            })?
            .id;
        let run_id = self.require_run()?;

        let url = format!(
            "{}/test/Runs/{}/Results/{}/attachments?api-version={}",
            self.api_root, run_id, result_id, API_VERSION_ATTACHMENTS
        );
        let mut payloads = Vec::with_capacity(attachments.len());
        for attachment in &attachments {
            payloads.push(
                serde_json::to_value(attachment)
                    .map_err(|e| AzureError::Malformed(e.to_string()))?,
            );
        }

        let uploads = payloads.into_iter().map(|payload| {
            api_request(
                &self.http,
                &url,
                JsonRequest::new(Method::POST)
                    .headers(self.json_headers())
                    .body(payload),
            )
        });
        future::try_join_all(uploads).await?;
        Ok(())
    }

    /// Bulk-uploads every attachment accumulated across the session as a
    /// run-level attachment.
    async fn send_test_run_attachments(&self) -> Result<(), AzureError> {
        let run_id = self.require_run()?;
        let url = format!(
            "{}/test/Runs/{}/attachments?api-version={}",
            self.api_root, run_id, API_VERSION_ATTACHMENTS
        );

        let mut payloads = Vec::with_capacity(self.run_attachments.len());
        for attachment in &self.run_attachments {
            payloads.push(
                serde_json::to_value(attachment)
                    .map_err(|e| AzureError::Malformed(e.to_string()))?,
            );
        }
        let uploads = payloads.into_iter().map(|payload| {
            api_request(
                &self.http,
                &url,
                JsonRequest::new(Method::POST)
                    .headers(self.json_headers())
                    .body(payload),
            )
        });
        future::try_join_all(uploads).await?;
        Ok(())
    }

    /// Moves the work item behind the test case to its post-automation
    /// backlog state, with a history note recording the automation outcome.
    async fn update_backlog_state(
        &self,
        test_case: &str,
        outcome: Outcome,
    ) -> Result<(), AzureError> {
        let (state, history) = match outcome {
            Outcome::Passed => (BACKLOG_STATE_READY, HISTORY_PASSED),
            _ => (BACKLOG_STATE_DESIGN, HISTORY_FAILED),
        };
        let url = format!(
            "{}/wit/workitems/{}?api-version={}",
            self.api_root, test_case, API_VERSION_WORK_ITEMS
        );
        let request = JsonRequest::new(Method::PATCH)
            .headers(self.patch_headers())
            .body(json!([
                {"op": "replace", "path": "/fields/System.State", "value": state},
                {"op": "add", "path": "/fields/System.History", "value": history},
            ]));
        api_request(&self.http, &url, request).await?;
        Ok(())
    }

    fn require_run(&self) -> Result<i64, AzureError> {
        self.run_id.ok_or(AzureError::RunNotCreated)
    }

    fn json_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Authorization".to_string(), self.auth_header.clone());
        headers
    }

    /// Headers for the work-item patch endpoint, which requires the
    /// JSON-patch media type.
    fn patch_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/json-patch+json".to_string(),
        );
        headers.insert("Authorization".to_string(), self.auth_header.clone());
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    fn sample_client(test_cases: Vec<&str>) -> TestRunClient {
        let config = AzureConfig {
            organization: "org".to_string(),
            project: "proj".to_string(),
            pat: "secret".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            plan_id: 10,
            suite_id: 20,
            test_cases: test_cases.into_iter().map(String::from).collect(),
        };
        TestRunClient::new(config).unwrap()
    }

    /// Seeds a registry entry the way `create_test_run` would.
    fn seed_result(client: &mut TestRunClient, test_case: &str, result_id: i64) {
        client.run_id = Some(7);
        client.registry.insert(
            test_case.to_string(),
            TestCaseInfo {
                point_id: Some(900),
                result: Some(TestResultData {
                    id: result_id,
                    state: Some("Pending".to_string()),
                    outcome: None,
                    comment: None,
                    iteration_details: vec![IterationDetail {
                        id: 1,
                        outcome: None,
                        started_date: None,
                        completed_date: None,
                        action_results: Vec::new(),
                    }],
                }),
            },
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = AzureConfig {
            organization: "org".to_string(),
            project: "proj".to_string(),
            pat: "secret".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            plan_id: 10,
            suite_id: 20,
            test_cases: vec!["1".to_string(), "1".to_string()],
        };
        assert!(matches!(
            TestRunClient::new(config),
            Err(AzureError::Config(_))
        ));
    }

    #[test]
    fn test_api_root_layout() {
        let client = sample_client(vec!["432"]);
        assert_eq!(client.api_root, "https://dev.azure.com/org/proj/_apis");
    }

    #[test]
    fn test_step_results_append_in_call_order() {
        let mut client = sample_client(vec!["432"]);
        seed_result(&mut client, "432", 5001);

        client
            .update_test_step_result("432", 0, Outcome::Passed)
            .unwrap();
        client
            .update_test_step_result("432", 1, Outcome::Failed)
            .unwrap();
        client
            .update_test_step_result("432", 1, Outcome::Passed)
            .unwrap();

        let actions = &client.result("432").unwrap().iteration_details[0].action_results;
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].action_path, "00000001");
        assert_eq!(actions[1].action_path, "00000002");
        // Same index appends again, never overwrites.
        assert_eq!(actions[2].action_path, "00000002");
        assert_eq!(actions[1].outcome, "failed");
        assert_eq!(actions[2].outcome, "passed");
    }

    #[test]
    fn test_step_result_copies_iteration_fields() {
        let mut client = sample_client(vec!["432"]);
        seed_result(&mut client, "432", 5001);

        client
            .update_test_step_result("432", 3, Outcome::Blocked)
            .unwrap();
        let action = &client.result("432").unwrap().iteration_details[0].action_results[0];
        assert_eq!(action.iteration_id, 1);
        assert_eq!(action.step_identifier, "3");
        assert_eq!(action.outcome, "blocked");
    }

    #[test]
    fn test_step_update_before_run_creation_fails() {
        let mut client = sample_client(vec!["432"]);
        let err = client
            .update_test_step_result("432", 0, Outcome::Passed)
            .unwrap_err();
        assert!(matches!(err, AzureError::MissingResult { .. }));
    }

    #[tokio::test]
    async fn test_case_update_before_run_creation_fails() {
        let mut client = sample_client(vec!["432"]);
        let err = client
            .update_test_case_result("432", Outcome::Passed, Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, AzureError::RunNotCreated));
    }

    #[tokio::test]
    async fn test_finalize_before_run_creation_fails() {
        let mut client = sample_client(vec!["432"]);
        let err = client.update_test_run_result().await.unwrap_err();
        assert!(matches!(err, AzureError::RunNotCreated));
    }

    #[test]
    fn test_attachment_conversion_prefixes_and_accumulates() {
        let mut client = sample_client(vec!["432"]);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"png bytes").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"text").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let attachments = client
            .convert_attachments_to_base64("432", dir.path())
            .unwrap();
        assert_eq!(attachments.len(), 2);

        let mut names: Vec<&str> = attachments.iter().map(|a| a.file_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["432 - a.png", "432 - b.txt"]);

        // Accumulator grows monotonically across calls.
        assert_eq!(client.run_attachments().len(), 2);
        client
            .convert_attachments_to_base64("432", dir.path())
            .unwrap();
        assert_eq!(client.run_attachments().len(), 4);
    }
}
