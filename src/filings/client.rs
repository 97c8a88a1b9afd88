use super::flatten::{flatten_response, CompensationTable};
use super::{Endpoint, FilingError, FilingResult};
use crate::config::{FilingsConfig, UserAgentConfig};
use crate::page::build_http_client;
use crate::HarvestError;
use reqwest::{Client, StatusCode};
use url::Url;

/// Substitutes `{cik}`, `{cik10}` and `{token}` in an endpoint template
///
/// `{cik10}` is the CIK zero-padded to ten digits, the form the SEC uses in
/// submission file names. A template without `{token}` ignores `token`.
pub fn endpoint_url(template: &str, cik: u64, token: Option<&str>) -> FilingResult<Url> {
    let mut url = template
        .replace("{cik10}", &format!("{:010}", cik))
        .replace("{cik}", &cik.to_string());

    if let Some(token) = token {
        url = url.replace("{token}", token);
    }

    Url::parse(&url).map_err(|source| FilingError::InvalidUrl { cik, source })
}

/// Fetches filing data for one company at a time
///
/// Holds its own HTTP client and the token read at startup; nothing is
/// shared with the job pipeline.
#[derive(Debug, Clone)]
pub struct FilingClient {
    client: Client,
    submissions_url: String,
    compensation_url: String,
    token: Option<String>,
}

impl FilingClient {
    pub fn new(
        client: Client,
        submissions_url: impl Into<String>,
        compensation_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            client,
            submissions_url: submissions_url.into(),
            compensation_url: compensation_url.into(),
            token,
        }
    }

    /// Builds a client from config, reading the token from the environment
    pub fn from_config(
        config: &FilingsConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, HarvestError> {
        let token = config.resolve_token()?;
        let client = build_http_client(user_agent)?;
        Ok(Self::new(
            client,
            config.submissions_url.clone(),
            config.compensation_url.clone(),
            token,
        ))
    }

    /// Returns the submission history for `cik` as the raw response text
    pub async fn fetch_submission(&self, cik: u64) -> FilingResult<String> {
        self.fetch(Endpoint::Submissions, cik).await
    }

    /// Returns the compensation entries for `cik` as a flat table
    pub async fn fetch_compensation(&self, cik: u64) -> FilingResult<CompensationTable> {
        let body = self.fetch(Endpoint::Compensation, cik).await?;
        flatten_response(cik, &body)
    }

    async fn fetch(&self, endpoint: Endpoint, cik: u64) -> FilingResult<String> {
        let template = match endpoint {
            Endpoint::Submissions => &self.submissions_url,
            Endpoint::Compensation => &self.compensation_url,
        };
        let url = endpoint_url(template, cik, self.token.as_deref())?;

        // The URL may carry the token, so only the endpoint and CIK are logged
        tracing::debug!("Fetching {} for CIK {}", endpoint, cik);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FilingError::Http {
                cik,
                source: source.without_url(),
            })?;

        classify_status(cik, response.status())?;

        let body = response.text().await.map_err(|source| FilingError::Http {
            cik,
            source: source.without_url(),
        })?;

        if body.trim().is_empty() {
            return Err(FilingError::NotFound { cik });
        }

        Ok(body)
    }
}

fn classify_status(cik: u64, status: StatusCode) -> FilingResult<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(FilingError::NotFound { cik }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FilingError::Unauthorized {
            cik,
            status: status.as_u16(),
        }),
        _ => Err(FilingError::Status {
            cik,
            status: status.as_u16(),
        }),
    }
}
