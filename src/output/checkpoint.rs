//! JSON-lines checkpoint for job records
//!
//! The first line is a [`CheckpointHeader`]; every following line is one
//! [`JobRecord`], appended and flushed as soon as it is extracted. Reopening a
//! checkpoint written for a different source or config hash starts over.

use super::json::write_text_file;
use super::OutputResult;
use crate::record::JobRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Path of the checkpoint kept next to a source's document
pub fn checkpoint_path(directory: &Path, source: &str) -> PathBuf {
    directory.join(format!("{}_job_description_data.jsonl.partial", source))
}

/// First line of a checkpoint file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointHeader {
    pub source: String,
    pub config_hash: String,
    pub started_at: DateTime<Utc>,
}

impl CheckpointHeader {
    fn matches(&self, source: &str, config_hash: &str) -> bool {
        self.source == source && self.config_hash == config_hash
    }
}

/// An open checkpoint being appended to
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Checkpoint {
    /// Opens the checkpoint at `path`, returning it with any recovered records
    ///
    /// With `fresh`, or when the existing file belongs to another source or
    /// config, the file is replaced and nothing is recovered. A truncated last
    /// line (from a crash mid-write) is dropped.
    pub fn open(
        path: &Path,
        source: &str,
        config_hash: &str,
        fresh: bool,
    ) -> OutputResult<(Self, Vec<JobRecord>)> {
        let mut header = None;
        let mut recovered = Vec::new();

        if path.exists() {
            if fresh {
                tracing::info!("Discarding checkpoint {} (fresh run)", path.display());
            } else {
                match read_checkpoint(path)? {
                    Some((existing, records)) if existing.matches(source, config_hash) => {
                        tracing::info!(
                            "Resuming {} from checkpoint started {} ({} records)",
                            source,
                            existing.started_at.to_rfc3339(),
                            records.len()
                        );
                        header = Some(existing);
                        recovered = records;
                    }
                    Some(_) => tracing::warn!(
                        "Checkpoint {} was written with a different configuration, starting over",
                        path.display()
                    ),
                    None => tracing::warn!(
                        "Checkpoint {} has no readable header, starting over",
                        path.display()
                    ),
                }
            }
        }

        let header = header.unwrap_or_else(|| CheckpointHeader {
            source: source.to_string(),
            config_hash: config_hash.to_string(),
            started_at: Utc::now(),
        });

        // Replace via rename so a torn trailing line is not followed by new
        // records and a crash mid-rewrite keeps the old file
        let mut contents = json_line(&header)?;
        for record in &recovered {
            contents.push_str(&json_line(record)?);
        }
        write_text_file(path, &contents)?;

        let file = OpenOptions::new().append(true).open(path)?;
        let checkpoint = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        };

        Ok((checkpoint, recovered))
    }

    /// Appends one record and flushes it to disk
    pub fn append(&mut self, record: &JobRecord) -> OutputResult<()> {
        self.write_line(record)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Removes the checkpoint once the final document has been written
    pub fn finish(self) -> OutputResult<()> {
        let Checkpoint { path, writer } = self;
        drop(writer);
        fs::remove_file(&path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

fn json_line<T: Serialize>(value: &T) -> OutputResult<String> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

fn read_checkpoint(path: &Path) -> OutputResult<Option<(CheckpointHeader, Vec<JobRecord>)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => match serde_json::from_str::<CheckpointHeader>(&line?) {
            Ok(header) => header,
            Err(_) => return Ok(None),
        },
        None => return Ok(None),
    };

    let mut records = Vec::new();
    for (number, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JobRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable checkpoint line {} in {}: {}",
                    number + 2,
                    path.display(),
                    e
                );
                break;
            }
        }
    }

    Ok(Some((header, records)))
}
