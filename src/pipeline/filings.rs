use crate::config::CompanyEntry;
use crate::filings::{Endpoint, FilingClient};
use crate::output::{write_compensation_csv, write_text_file, FilingsReport};
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};

/// Fetches every endpoint for every company, one request at a time
///
/// A company without data is noted and skipped; any other failure is logged
/// and counted. Neither stops the remaining companies.
pub async fn run_filings(
    client: &FilingClient,
    companies: &[CompanyEntry],
    endpoints: &[Endpoint],
    directory: &Path,
) -> FilingsReport {
    let mut report = FilingsReport::default();

    for company in companies {
        for endpoint in endpoints {
            let label = format!("{} ({})", company.name, endpoint);

            match fetch_and_write(client, company, *endpoint, directory).await {
                Ok(path) => {
                    tracing::info!("{}: wrote {}", label, path.display());
                    report.written.push(path);
                }
                Err(HarvestError::Filing(e)) if e.is_not_found() => {
                    tracing::warn!("{}: {}", label, e);
                    report.not_found.push(label);
                }
                Err(e) => {
                    tracing::warn!("{}: {}", label, e);
                    report.failures.push(format!("{}: {}", label, e));
                }
            }
        }
    }

    report
}

async fn fetch_and_write(
    client: &FilingClient,
    company: &CompanyEntry,
    endpoint: Endpoint,
    directory: &Path,
) -> Result<PathBuf> {
    match endpoint {
        Endpoint::Submissions => {
            let body = client.fetch_submission(company.cik).await?;
            let path = company.submissions_path(directory);
            write_text_file(&path, &body)?;
            Ok(path)
        }
        Endpoint::Compensation => {
            let table = client.fetch_compensation(company.cik).await?;
            tracing::debug!(
                "{}: {} compensation rows, {} columns",
                company.name,
                table.len(),
                table.columns.len()
            );
            let path = company.csv_path(directory);
            write_compensation_csv(&table, &path)?;
            Ok(path)
        }
    }
}
