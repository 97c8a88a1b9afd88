//! JSON documents
//!
//! Job documents are a single array, indented with four spaces, with
//! non-ASCII text written as-is. Files are written to a sibling temp file
//! and renamed so a crash never leaves a half-written document behind.

use super::OutputResult;
use crate::record::JobRecord;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the final document for a source
pub fn job_document_path(directory: &Path, source: &str) -> PathBuf {
    directory.join(format!("{}_job_description_data.json", source))
}

/// Renders records as the output document; an empty slice renders `[]`
pub fn format_job_document(records: &[JobRecord]) -> OutputResult<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;

    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes records to `path`, replacing any previous document
pub fn write_job_document(path: &Path, records: &[JobRecord]) -> OutputResult<()> {
    let document = format_job_document(records)?;
    write_text_file(path, &document)
}

/// Reads a document written by [`write_job_document`]
pub fn read_job_document(path: &Path) -> OutputResult<Vec<JobRecord>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Writes `contents` to `path` through a temp file and rename
pub fn write_text_file(path: &Path, contents: &str) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, contents)?;
    fs::rename(&temp, path)?;
    Ok(())
}
