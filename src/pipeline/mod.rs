//! Harvest orchestration
//!
//! This module wires configuration, page loading, extraction and output
//! together:
//! - One [`JobPipeline`] per configured job source, run one after another
//! - The filing fetcher over every configured company
//! - A [`RunSummary`] covering both

mod filings;
mod jobs;

pub use filings::run_filings;
pub use jobs::{JobPipeline, Listing};

use crate::config::Config;
use crate::filings::FilingClient;
use crate::output::{RunSummary, SourceReport};
use crate::page::PageSource;
use crate::{ConfigError, Result};
use std::sync::Arc;

/// What a run should do
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ignore checkpoints from an interrupted run
    pub fresh: bool,

    /// Run the job sources
    pub jobs: bool,

    /// Run the filing fetcher
    pub filings: bool,

    /// Restrict the job sources to these names (all when empty)
    pub only_sources: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fresh: false,
            jobs: true,
            filings: true,
            only_sources: Vec::new(),
        }
    }
}

impl RunOptions {
    fn includes(&self, source: &str) -> bool {
        self.only_sources.is_empty()
            || self
                .only_sources
                .iter()
                .any(|name| name.eq_ignore_ascii_case(source))
    }
}

/// Runs the configured job sources and filing fetches
///
/// A failing source or company is recorded in the summary and the run goes
/// on. Errors returned from here are configuration problems: an unknown
/// `--source` name or a missing API token.
pub async fn run_harvest<S: PageSource>(
    config: &Config,
    config_hash: &str,
    pages: Arc<S>,
    options: &RunOptions,
) -> Result<RunSummary> {
    for name in &options.only_sources {
        if !config
            .sources
            .iter()
            .any(|source| source.name.eq_ignore_ascii_case(name))
        {
            return Err(ConfigError::Validation(format!("No source named '{}'", name)).into());
        }
    }

    let mut summary = RunSummary::start();
    let directory = config.output.directory();

    if options.jobs {
        for source in config.sources.iter().filter(|s| options.includes(&s.name)) {
            tracing::info!(
                "Harvesting {} ({}) from {}",
                source.name,
                source.site,
                source.search_url
            );

            let result = match JobPipeline::new(source.clone(), pages.clone()) {
                Ok(pipeline) => pipeline.run(directory, config_hash, options.fresh).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(report) => summary.sources.push(report),
                Err(e) => {
                    tracing::warn!("Source {} failed: {}", source.name, e);
                    summary.sources.push(SourceReport::failed(&source.name, e));
                }
            }
        }
    }

    if options.filings {
        match &config.filings {
            Some(filings) if !filings.companies.is_empty() => {
                let client = FilingClient::from_config(filings, &config.user_agent)?;
                tracing::info!(
                    "Fetching {} for {} companies",
                    filings
                        .endpoints
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    filings.companies.len()
                );
                summary.filings = Some(
                    run_filings(&client, &filings.companies, &filings.endpoints, directory).await,
                );
            }
            _ => tracing::debug!("No companies configured, skipping filings"),
        }
    }

    summary.finish();
    Ok(summary)
}
