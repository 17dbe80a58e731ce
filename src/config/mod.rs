//! Session configuration records.
//!
//! Configuration is explicit: the records are constructed once at session
//! start (either directly or from process environment) and handed to the
//! pieces that need them. Nothing in the crate reads environment variables
//! behind the caller's back.
//!
//! Recognized environment variables:
//!
//! - `AZURE_ORGANIZATION`: Azure DevOps organization name
//! - `AZURE_PROJECT`: project name
//! - `AZURE_PAT`: personal access token
//! - `AZURE_BASE_URL`: optional, defaults to `https://dev.azure.com`
//! - `MONGODB_URI`, `DB_USER`, `DB_PASSWORD`, `DB_URL`: database credentials

use std::collections::HashSet;
use std::env;
use std::fmt;
use url::Url;

/// Default Azure DevOps service root.
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";

/// Configuration validation and environment errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or not unicode.
    MissingEnv(String),
    /// The configured test-case id list is empty.
    NoTestCases,
    /// The same test-case id appears more than once in the configured list.
    DuplicateTestCase(String),
    /// The base URL could not be parsed.
    InvalidBaseUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnv(name) => {
                write!(f, "Environment variable {} is not set", name)
            }
            ConfigError::NoTestCases => write!(f, "No test case ids configured"),
            ConfigError::DuplicateTestCase(id) => {
                write!(f, "Duplicate test case id in configuration: {}", id)
            }
            ConfigError::InvalidBaseUrl(url) => write!(f, "Invalid base URL: {}", url),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for one test-run session against Azure DevOps.
#[derive(Debug, Clone)]
pub struct AzureConfig {
    /// Azure DevOps organization name.
    pub organization: String,
    /// Project name within the organization.
    pub project: String,
    /// Personal access token, sent over HTTP Basic.
    pub pat: String,
    /// Service root, normally [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Test plan containing the targeted suite.
    pub plan_id: i64,
    /// Suite the configured test cases belong to.
    pub suite_id: i64,
    /// Work-item ids of the test cases covered by this session.
    pub test_cases: Vec<String>,
}

impl AzureConfig {
    /// Builds a configuration from the `AZURE_*` environment variables plus
    /// the per-session plan, suite, and test-case selection.
    pub fn from_env(
        plan_id: i64,
        suite_id: i64,
        test_cases: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            organization: require_env("AZURE_ORGANIZATION")?,
            project: require_env("AZURE_PROJECT")?,
            pat: require_env("AZURE_PAT")?,
            base_url: env::var("AZURE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            plan_id,
            suite_id,
            test_cases,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Duplicate test-case ids are rejected rather than deduplicated: a
    /// repeated id almost always means a misconfigured suite, and silently
    /// collapsing it would hide the mistake.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if self.test_cases.is_empty() {
            return Err(ConfigError::NoTestCases);
        }
        let mut seen = HashSet::new();
        for id in &self.test_cases {
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateTestCase(id.clone()));
            }
        }
        Ok(())
    }
}

/// Database credentials for the session-scoped connection helpers.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// Relational database user.
    pub user: String,
    /// Relational database password.
    pub password: String,
    /// Relational database connection URL.
    pub url: String,
}

impl DbConfig {
    /// Builds the database configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            mongo_uri: require_env("MONGODB_URI")?,
            user: require_env("DB_USER")?,
            password: require_env("DB_PASSWORD")?,
            url: require_env("DB_URL")?,
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_string()))
}
