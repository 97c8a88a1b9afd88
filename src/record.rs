//! Job posting records
//!
//! A [`JobRecord`] is the unit written to `{source}_job_description_data.json`.
//! Only `link` is guaranteed; every other field is best-effort and simply
//! absent from the JSON object when it could not be extracted. `salary` is the
//! one exception: Indeed cards without a salary block record an explicit
//! `null`, which is distinguishable from "not an Indeed record".

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Criterion key for the employment type (full-time, contract, ...)
pub const EMPLOYMENT_TYPE: &str = "Employment type";

/// Fields extracted from one job posting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Posting URL
    pub link: String,

    /// Posting title
    #[serde(
        rename = "job_description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// `None`: not recorded for this source. `Some(None)`: recorded as missing.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub salary: Option<Option<String>>,

    /// Criterion label -> value, e.g. "Seniority level" -> "Entry level", in page order
    #[serde(flatten)]
    pub criteria: IndexMap<String, Option<String>>,

    #[serde(rename = "job_paragraphs", default)]
    pub paragraphs: Vec<String>,

    #[serde(rename = "job_bullets", default)]
    pub bullets: Vec<String>,
}

impl JobRecord {
    /// Creates an empty record for the given posting link
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    /// Sets a criterion, replacing any previous value for the same label
    pub fn set_criterion(&mut self, label: impl Into<String>, value: Option<String>) {
        self.criteria.insert(label.into(), value);
    }

    /// Returns the employment type if one was extracted
    pub fn employment_type(&self) -> Option<&str> {
        self.criteria
            .get(EMPLOYMENT_TYPE)
            .and_then(|value| value.as_deref())
    }

    /// True once the employment type was resolved, even if resolved to `null`
    pub fn has_employment_type(&self) -> bool {
        self.criteria.contains_key(EMPLOYMENT_TYPE)
    }
}

// A present key always deserializes to `Some`, so `"salary": null` survives a round trip
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
