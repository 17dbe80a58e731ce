//! Environment-driven configuration tests.
//!
//! These tests mutate process environment variables, so they run serially.

use azure_testops::{AzureConfig, ConfigError, DbConfig};
use serial_test::serial;
use std::env;

fn clear_azure_env() {
    for name in ["AZURE_ORGANIZATION", "AZURE_PROJECT", "AZURE_PAT", "AZURE_BASE_URL"] {
        env::remove_var(name);
    }
}

fn set_azure_env() {
    env::set_var("AZURE_ORGANIZATION", "contoso");
    env::set_var("AZURE_PROJECT", "webshop");
    env::set_var("AZURE_PAT", "pat-token");
}

#[test]
#[serial]
fn test_from_env_reads_azure_variables() {
    clear_azure_env();
    set_azure_env();

    let config = AzureConfig::from_env(10, 20, vec!["432".to_string()]).unwrap();
    assert_eq!(config.organization, "contoso");
    assert_eq!(config.project, "webshop");
    assert_eq!(config.pat, "pat-token");
    assert_eq!(config.base_url, "https://dev.azure.com");
    assert_eq!(config.plan_id, 10);
    assert_eq!(config.suite_id, 20);
}

#[test]
#[serial]
fn test_from_env_honors_base_url_override() {
    clear_azure_env();
    set_azure_env();
    env::set_var("AZURE_BASE_URL", "https://azure.example.com");

    let config = AzureConfig::from_env(10, 20, vec!["432".to_string()]).unwrap();
    assert_eq!(config.base_url, "https://azure.example.com");
}

#[test]
#[serial]
fn test_from_env_missing_variable_fails() {
    clear_azure_env();
    env::set_var("AZURE_ORGANIZATION", "contoso");
    env::set_var("AZURE_PROJECT", "webshop");

    let err = AzureConfig::from_env(10, 20, vec!["432".to_string()]).unwrap_err();
    assert_eq!(err, ConfigError::MissingEnv("AZURE_PAT".to_string()));
}

#[test]
#[serial]
fn test_from_env_rejects_duplicate_test_cases() {
    clear_azure_env();
    set_azure_env();

    let err =
        AzureConfig::from_env(10, 20, vec!["432".to_string(), "432".to_string()]).unwrap_err();
    assert_eq!(err, ConfigError::DuplicateTestCase("432".to_string()));
}

#[test]
#[serial]
fn test_db_config_from_env() {
    env::set_var("MONGODB_URI", "mongodb://localhost:27017");
    env::set_var("DB_USER", "qa");
    env::set_var("DB_PASSWORD", "secret");
    env::set_var("DB_URL", "postgres://localhost:5432/testdb");

    let config = DbConfig::from_env().unwrap();
    assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
    assert_eq!(config.user, "qa");
    assert_eq!(config.password, "secret");
    assert_eq!(config.url, "postgres://localhost:5432/testdb");

    env::remove_var("MONGODB_URI");
    let err = DbConfig::from_env().unwrap_err();
    assert_eq!(err, ConfigError::MissingEnv("MONGODB_URI".to_string()));
}
