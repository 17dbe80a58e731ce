//! Logging setup and the per-test-case assertion log.
//!
//! Library code logs through the `log` facade; [`init`] wires it to
//! `env_logger` with an info default so HTTP status lines and connection
//! confirmations show up without configuration. The [`AssertionLogger`] is
//! separate: it keeps the human-readable assertion trail, echoing each line
//! to stdout and appending it to `AssertionResults.txt` in the test case's
//! artifact directory. That file ends up attached to the host framework's
//! report and uploaded as a remote attachment.

use crate::fsutil;
use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name of the assertion trail inside an artifact directory.
pub const ASSERTION_LOG_FILE: &str = "AssertionResults.txt";

static INIT: OnceCell<()> = OnceCell::new();

/// Initializes `env_logger` with an info-level default filter.
///
/// Safe to call from every test; only the first call installs the logger.
pub fn init() {
    INIT.get_or_init(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    });
}

/// Append-mode text sink for assertion results, rooted at an artifact
/// directory that is created if absent.
#[derive(Debug)]
pub struct AssertionLogger {
    path: PathBuf,
    sink: File,
}

impl AssertionLogger {
    /// Opens (or creates) the assertion log under `dir`.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        fsutil::create_directory(&dir)?;
        let path = dir.as_ref().join(ASSERTION_LOG_FILE);
        let sink = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, sink })
    }

    /// Emits a message to the process console and appends it to the sink.
    pub fn log(&mut self, message: &str) -> io::Result<()> {
        println!("{}", message);
        writeln!(self.sink, "{}", message)
    }

    /// Path of the log file, for attaching it to the test report.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_logger_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let artifact_dir = dir.path().join("case-432");
        let mut logger = AssertionLogger::new(&artifact_dir).unwrap();
        logger.log("first line").unwrap();

        let content = fs::read_to_string(artifact_dir.join(ASSERTION_LOG_FILE)).unwrap();
        assert_eq!(content, "first line\n");
    }

    #[test]
    fn test_logger_appends_across_instances() {
        let dir = TempDir::new().unwrap();
        {
            let mut logger = AssertionLogger::new(dir.path()).unwrap();
            logger.log("one").unwrap();
        }
        {
            let mut logger = AssertionLogger::new(dir.path()).unwrap();
            logger.log("two").unwrap();
        }

        let content = fs::read_to_string(dir.path().join(ASSERTION_LOG_FILE)).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }

    #[test]
    fn test_path_points_at_the_log_file() {
        let dir = TempDir::new().unwrap();
        let logger = AssertionLogger::new(dir.path()).unwrap();
        assert!(logger.path().ends_with(ASSERTION_LOG_FILE));
    }
}
