use serde::{Deserialize, Serialize};
use std::fmt;

/// Query date in `DD-MM-YYYY` form, as used by the gazette listing URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchDate(String);

impl SearchDate {
    /// Wrap an already-normalized date string
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One portaria found on the day's listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortariaListing {
    pub title: String,
    pub detail_url: String,
}

/// Portaria as reported back to the caller, with its certified link if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortariaRef {
    pub title: String,
    pub detail_url: String,
    pub certified_url: Option<String>,
}

/// One applicant extracted from a nationality-grant clause.
///
/// Every field is kept as the trimmed source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalizationRecord {
    pub name: String,
    pub id: String,
    pub origin: String,
    pub birth_date: String,
    pub parent1: String,
    pub parent2: String,
    pub process: String,
}

/// Outcome for a single portaria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub portaria: PortariaRef,
    pub naturalizados: Vec<NaturalizationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Successful `/fetch` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchReport {
    pub date: SearchDate,
    pub results: Vec<ResultEntry>,
}
