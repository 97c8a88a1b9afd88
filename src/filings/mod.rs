//! Filing fetcher
//!
//! This module handles company filing data, including:
//! - Building endpoint URLs from `{cik}`, `{cik10}` and `{token}` templates
//! - Classifying responses (missing company, rejected token, other failures)
//! - Flattening compensation JSON into a CSV-ready table

mod client;
mod flatten;

pub use client::{endpoint_url, FilingClient};
pub use flatten::{flatten_response, CompensationTable};

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Filing endpoints queried per company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Public submission history, kept as raw JSON text
    Submissions,

    /// Executive compensation, flattened to CSV
    Compensation,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Submissions => write!(f, "submissions"),
            Endpoint::Compensation => write!(f, "compensation"),
        }
    }
}

/// Errors that can occur while fetching filings for one company
#[derive(Debug, Error)]
pub enum FilingError {
    /// The endpoint has nothing for this CIK
    #[error("No filing data for CIK {cik}")]
    NotFound { cik: u64 },

    #[error("Request for CIK {cik} was rejected with HTTP {status} (check the API token)")]
    Unauthorized { cik: u64, status: u16 },

    #[error("HTTP {status} fetching CIK {cik}")]
    Status { cik: u64, status: u16 },

    #[error("Request for CIK {cik} failed: {source}")]
    Http { cik: u64, source: reqwest::Error },

    #[error("Unexpected response shape for CIK {cik}: {message}")]
    MalformedShape { cik: u64, message: String },

    #[error("Endpoint URL for CIK {cik} is invalid: {source}")]
    InvalidUrl { cik: u64, source: url::ParseError },
}

impl FilingError {
    /// True when the company simply has no data, as opposed to a failed request
    pub fn is_not_found(&self) -> bool {
        matches!(self, FilingError::NotFound { .. })
    }
}

/// Result type for filing operations
pub type FilingResult<T> = Result<T, FilingError>;
