//! Log-then-check assertion helpers.
//!
//! Each helper writes an "Expected/Obtained" line through the
//! [`AssertionLogger`] before performing its check, so the human-readable
//! trail exists even when the check fails. Failures come back as
//! [`AssertionError`] values rather than panics; the step-level harness code
//! records the step outcome as failed and re-raises.
//!
//! The UI side is abstracted behind [`UiElement`] so any browser-automation
//! framework's locator can plug in.

use crate::logging::AssertionLogger;
use serde_json::Value;
use std::fmt;

/// A failed assertion, carrying the message that was logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionError {
    message: String,
}

impl AssertionError {
    /// Builds an assertion failure with an explicit message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn mismatch(expected: &str, obtained: &str) -> Self {
        Self::fail(format!("expected {} but obtained {}", expected, obtained))
    }
}

impl fmt::Display for AssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test Failed: {}", self.message)
    }
}

impl std::error::Error for AssertionError {}

/// The seam to a browser-automation framework's locator.
///
/// Implementations read the current state of an on-page element; the
/// assertion helpers only need the rendered text and the input value.
pub trait UiElement {
    /// The element's rendered inner text.
    fn inner_text(&self) -> String;
    /// The element's current input value.
    fn input_value(&self) -> String;
}

/// Asserts deep equality of two JSON values, logging both first.
pub fn json_assertion(
    obtained: &Value,
    expected: &Value,
    logger: &mut AssertionLogger,
) -> Result<(), AssertionError> {
    log_result(logger, &expected.to_string(), &obtained.to_string())?;
    if obtained == expected {
        Ok(())
    } else {
        Err(AssertionError::mismatch(
            &expected.to_string(),
            &obtained.to_string(),
        ))
    }
}

/// Asserts equality of two literal values, logging both first.
pub fn literal_values_assertion<T: fmt::Debug + PartialEq>(
    obtained: &T,
    expected: &T,
    logger: &mut AssertionLogger,
) -> Result<(), AssertionError> {
    let expected_text = format!("{:?}", expected);
    let obtained_text = format!("{:?}", obtained);
    log_result(logger, &expected_text, &obtained_text)?;
    if obtained == expected {
        Ok(())
    } else {
        Err(AssertionError::mismatch(&expected_text, &obtained_text))
    }
}

/// Asserts that an input element holds exactly the expected value.
pub fn input_value_assertion(
    element: &dyn UiElement,
    expected: &str,
    logger: &mut AssertionLogger,
) -> Result<(), AssertionError> {
    let obtained = element.input_value();
    log_result(logger, expected, &obtained)?;
    if obtained == expected {
        Ok(())
    } else {
        Err(AssertionError::mismatch(expected, &obtained))
    }
}

/// Asserts that an element's text contains the expected fragment.
pub fn locator_text_assertion(
    element: &dyn UiElement,
    expected: &str,
    logger: &mut AssertionLogger,
) -> Result<(), AssertionError> {
    let obtained = element.inner_text();
    log_result(logger, expected, &obtained)?;
    if obtained.contains(expected) {
        Ok(())
    } else {
        Err(AssertionError::fail(format!(
            "expected text to contain {} but obtained {}",
            expected, obtained
        )))
    }
}

fn log_result(
    logger: &mut AssertionLogger,
    expected: &str,
    obtained: &str,
) -> Result<(), AssertionError> {
    logger
        .log(&format!(
            "ASSERTION RESULT:\n Expected: {} \n Obtained: {}",
            expected, obtained
        ))
        .map_err(|e| AssertionError::fail(format!("assertion log write failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    struct FakeElement {
        text: String,
        value: String,
    }

    impl UiElement for FakeElement {
        fn inner_text(&self) -> String {
            self.text.clone()
        }
        fn input_value(&self) -> String {
            self.value.clone()
        }
    }

    fn logger(dir: &TempDir) -> AssertionLogger {
        AssertionLogger::new(dir.path()).unwrap()
    }

    #[test]
    fn test_json_assertion_deep_equality() {
        let dir = TempDir::new().unwrap();
        let mut log = logger(&dir);

        let expected = json!({"user": {"id": 1, "roles": ["admin"]}});
        let obtained = json!({"user": {"id": 1, "roles": ["admin"]}});
        assert!(json_assertion(&obtained, &expected, &mut log).is_ok());

        let wrong = json!({"user": {"id": 2, "roles": ["admin"]}});
        assert!(json_assertion(&wrong, &expected, &mut log).is_err());
    }

    #[test]
    fn test_mismatch_is_logged_before_failing() {
        let dir = TempDir::new().unwrap();
        let mut log = logger(&dir);

        let _ = literal_values_assertion(&41, &42, &mut log);
        let content =
            fs::read_to_string(dir.path().join(crate::logging::ASSERTION_LOG_FILE)).unwrap();
        assert!(content.contains("Expected: 42"));
        assert!(content.contains("Obtained: 41"));
    }

    #[test]
    fn test_literal_values_assertion() {
        let dir = TempDir::new().unwrap();
        let mut log = logger(&dir);

        assert!(literal_values_assertion(&"same", &"same", &mut log).is_ok());
        let err = literal_values_assertion(&1, &2, &mut log).unwrap_err();
        assert!(format!("{}", err).starts_with("Test Failed:"));
    }

    #[test]
    fn test_input_value_assertion_is_exact() {
        let dir = TempDir::new().unwrap();
        let mut log = logger(&dir);
        let element = FakeElement {
            text: String::new(),
            value: "hello world".to_string(),
        };

        assert!(input_value_assertion(&element, "hello world", &mut log).is_ok());
        assert!(input_value_assertion(&element, "hello", &mut log).is_err());
    }

    #[test]
    fn test_locator_text_assertion_is_contains() {
        let dir = TempDir::new().unwrap();
        let mut log = logger(&dir);
        let element = FakeElement {
            text: "Welcome back, Alice".to_string(),
            value: String::new(),
        };

        assert!(locator_text_assertion(&element, "Welcome", &mut log).is_ok());
        assert!(locator_text_assertion(&element, "Goodbye", &mut log).is_err());
    }

    #[test]
    fn test_explicit_failure_message() {
        let err = AssertionError::fail("precondition not met");
        assert_eq!(format!("{}", err), "Test Failed: precondition not met");
    }
}
