use regex::Regex;
use std::fmt;

/// Decides which listing cards are kept, by title
#[derive(Debug, Clone)]
pub enum KeywordFilter {
    /// Case-sensitive substring match
    Substring(String),

    /// Regular expression search anywhere in the title
    Pattern(Regex),
}

impl KeywordFilter {
    pub fn substring(keyword: impl Into<String>) -> Self {
        Self::Substring(keyword.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Returns true if the title passes the filter
    pub fn matches(&self, title: &str) -> bool {
        match self {
            Self::Substring(keyword) => title.contains(keyword.as_str()),
            Self::Pattern(regex) => regex.is_match(title),
        }
    }
}

impl fmt::Display for KeywordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring(keyword) => write!(f, "\"{}\"", keyword),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}
