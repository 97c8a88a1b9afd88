use crate::config::types::{Config, FilingsConfig, OutputConfig, SourceConfig, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sources(&config.sources)?;
    if let Some(filings) = &config.filings {
        validate_filings_config(filings)?;
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates job board sources
fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for source in sources {
        if source.name.is_empty()
            || !source
                .name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "Source name must be non-empty and contain only alphanumerics, '-' or '_', got '{}'",
                source.name
            )));
        }

        if !names.insert(source.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate source name '{}'",
                source.name
            )));
        }

        let url = Url::parse(&source.search_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid search-url '{}': {}",
                source.search_url, e
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "search-url '{}' must use HTTP or HTTPS",
                source.search_url
            )));
        }

        // Compiles the pattern and enforces keyword xor keyword-pattern
        source.keyword_filter()?;

        if source.max_pages < 1 || source.max_pages > 50 {
            return Err(ConfigError::Validation(format!(
                "max-pages must be between 1 and 50, got {}",
                source.max_pages
            )));
        }

        if source.max_wait_ms < 100 || source.max_wait_ms > 600_000 {
            return Err(ConfigError::Validation(format!(
                "max-wait-ms must be between 100 and 600000, got {}",
                source.max_wait_ms
            )));
        }

        if source.poll_interval_ms < 10 || source.poll_interval_ms > source.max_wait_ms {
            return Err(ConfigError::Validation(format!(
                "poll-interval-ms must be between 10 and max-wait-ms ({}), got {}",
                source.max_wait_ms, source.poll_interval_ms
            )));
        }

        if source.max_concurrent_pages < 1 || source.max_concurrent_pages > 16 {
            return Err(ConfigError::Validation(format!(
                "max-concurrent-pages must be between 1 and 16, got {}",
                source.max_concurrent_pages
            )));
        }
    }

    Ok(())
}

/// Validates filing endpoints and companies
fn validate_filings_config(config: &FilingsConfig) -> Result<(), ConfigError> {
    if config.token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "token-env cannot be empty".to_string(),
        ));
    }

    for endpoint in &config.endpoints {
        let template = config.template(*endpoint);
        if !template.contains("{cik}") && !template.contains("{cik10}") {
            return Err(ConfigError::Validation(format!(
                "{} endpoint template must contain {{cik}} or {{cik10}}, got '{}'",
                endpoint, template
            )));
        }
        // Placeholders are valid path/query characters, so the raw template must parse
        Url::parse(template).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid {} template: {}", endpoint, e))
        })?;
    }

    let mut slugs = HashSet::new();
    for company in &config.companies {
        if company.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "company name cannot be empty".to_string(),
            ));
        }
        if company.cik == 0 || company.cik > 9_999_999_999 {
            return Err(ConfigError::Validation(format!(
                "CIK for '{}' must have 1 to 10 digits, got {}",
                company.name, company.cik
            )));
        }
        if !slugs.insert(company.slug()) {
            return Err(ConfigError::Validation(format!(
                "Companies '{}' would share an output file",
                company.name
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
