use super::checkpoint::{checkpoint_path, Checkpoint};
use super::json::{job_document_path, write_job_document};
use super::OutputResult;
use crate::record::JobRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Collects the records of one source and writes its final document
///
/// Records may arrive in any order (postings are extracted concurrently);
/// [`RecordAggregator::finish`] restores listing order. Every record is
/// checkpointed on arrival.
#[derive(Debug)]
pub struct RecordAggregator {
    document_path: PathBuf,
    checkpoint: Checkpoint,
    records: HashMap<String, JobRecord>,
    recovered: usize,
}

impl RecordAggregator {
    /// Opens the aggregator for `source`, recovering checkpointed records unless `fresh`
    pub fn open(
        directory: &Path,
        source: &str,
        config_hash: &str,
        fresh: bool,
    ) -> OutputResult<Self> {
        let (checkpoint, recovered) = Checkpoint::open(
            &checkpoint_path(directory, source),
            source,
            config_hash,
            fresh,
        )?;

        let recovered_count = recovered.len();
        let records = recovered
            .into_iter()
            .map(|record| (record.link.clone(), record))
            .collect();

        Ok(Self {
            document_path: job_document_path(directory, source),
            checkpoint,
            records,
            recovered: recovered_count,
        })
    }

    /// True if a record for `link` is already held (extracted now or recovered)
    pub fn contains(&self, link: &str) -> bool {
        self.records.contains_key(link)
    }

    /// Number of records recovered from the checkpoint
    pub fn recovered(&self) -> usize {
        self.recovered
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checkpoints and stores a record
    pub fn push(&mut self, record: JobRecord) -> OutputResult<()> {
        self.checkpoint.append(&record)?;
        self.records.insert(record.link.clone(), record);
        Ok(())
    }

    /// Writes the document in `order` and removes the checkpoint
    ///
    /// Links in `order` without a record (failed postings) are skipped, as
    /// are recovered records whose link is no longer listed.
    pub fn finish(mut self, order: &[String]) -> OutputResult<(PathBuf, usize)> {
        let ordered: Vec<JobRecord> = order
            .iter()
            .filter_map(|link| self.records.remove(link))
            .collect();

        if !self.records.is_empty() {
            tracing::debug!(
                "Dropping {} checkpointed records no longer in the listing",
                self.records.len()
            );
        }

        write_job_document(&self.document_path, &ordered)?;
        self.checkpoint.finish()?;

        Ok((self.document_path, ordered.len()))
    }
}
