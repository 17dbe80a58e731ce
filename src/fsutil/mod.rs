//! Filesystem helpers for artifact collection.
//!
//! Small wrappers over `std::fs` used by the attachment pipeline and the
//! assertion logger. Failures propagate unchanged; nothing here retries or
//! masks an unreadable path.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates a directory, including missing parents. Idempotent.
pub fn create_directory(path: impl AsRef<Path>) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Reads a file fully into memory and returns its standard base64 encoding.
pub fn file_to_base64(path: impl AsRef<Path>) -> io::Result<String> {
    let data = fs::read(path)?;
    Ok(STANDARD.encode(data))
}

/// Returns the regular files directly inside `dir`. Subdirectories are
/// skipped; order is not significant.
pub fn list_files(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}
