//! Run summary
//!
//! Counts what each pipeline produced and what failed, and prints the
//! summary shown at the end of a run.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Outcome of harvesting one job source
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    pub name: String,

    /// Postings that matched the keyword filter
    pub listed: usize,

    /// Records written to the document
    pub records: usize,

    /// Records taken from a checkpoint instead of being extracted again
    pub resumed: usize,

    /// Postings that failed, as `link: error`
    pub failures: Vec<String>,

    /// Document written, if the source finished
    pub output: Option<PathBuf>,

    /// Error that stopped the whole source
    pub error: Option<String>,
}

impl SourceReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn failed(name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(name)
        }
    }
}

/// Outcome of the filing fetcher
#[derive(Debug, Clone, Default)]
pub struct FilingsReport {
    /// Files written, in fetch order
    pub written: Vec<PathBuf>,

    /// `company (endpoint)` pairs the API had no data for
    pub not_found: Vec<String>,

    /// `company (endpoint): error` for every other failure
    pub failures: Vec<String>,
}

/// Summary of a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub sources: Vec<SourceReport>,
    pub filings: Option<FilingsReport>,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            sources: Vec::new(),
            filings: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_records(&self) -> usize {
        self.sources.iter().map(|s| s.records).sum()
    }

    /// Failed postings, failed sources and failed filing fetches
    pub fn total_failures(&self) -> usize {
        let sources: usize = self
            .sources
            .iter()
            .map(|s| s.failures.len() + usize::from(s.error.is_some()))
            .sum();
        let filings = self.filings.as_ref().map_or(0, |f| f.failures.len());
        sources + filings
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    if let Some(finished) = summary.finished_at {
        println!(
            "Duration: {}s",
            (finished - summary.started_at).num_seconds()
        );
        println!();
    }

    if !summary.sources.is_empty() {
        println!("Job Sources:");
        for source in &summary.sources {
            match &source.error {
                Some(error) => println!("  {}: FAILED ({})", source.name, error),
                None => println!(
                    "  {}: {} records from {} listed ({} resumed, {} failed)",
                    source.name,
                    source.records,
                    source.listed,
                    source.resumed,
                    source.failures.len()
                ),
            }
            if let Some(output) = &source.output {
                println!("    -> {}", output.display());
            }
            for failure in &source.failures {
                println!("    ! {}", failure);
            }
        }
        println!();
    }

    if let Some(filings) = &summary.filings {
        println!("Filings:");
        println!("  Files written: {}", filings.written.len());
        for path in &filings.written {
            println!("    -> {}", path.display());
        }
        if !filings.not_found.is_empty() {
            println!("  No data ({}):", filings.not_found.len());
            for entry in &filings.not_found {
                println!("    - {}", entry);
            }
        }
        for failure in &filings.failures {
            println!("    ! {}", failure);
        }
        println!();
    }

    println!(
        "Total: {} records, {} failures",
        summary.total_records(),
        summary.total_failures()
    );
}
