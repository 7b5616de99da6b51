//! Result types: what one page yields and how pages combine.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A free-form mapping of field name to scalar value as returned by the
/// model (values are strings or numbers; no schema is enforced beyond
/// valid JSON).
pub type Fields = serde_json::Map<String, Value>;

/// Structured data extracted from one report page.
///
/// Both maps default to empty so a partially-shaped model reply (one key
/// missing) still deserializes instead of failing the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Non-medical fields: patient name, age, report date, lab name.
    #[serde(default)]
    pub key_value_pairs: Fields,

    /// Medical terms and their values, e.g. `hemoglobin: "13.5 g/dL"`.
    #[serde(default)]
    pub extracted_tests: Fields,
}

impl ExtractionResult {
    /// True when neither map holds any entry.
    pub fn is_empty(&self) -> bool {
        self.key_value_pairs.is_empty() && self.extracted_tests.is_empty()
    }

    /// Merge another page's fields into this one. Entries from `other`
    /// overwrite existing keys (last write wins).
    pub fn absorb(&mut self, other: ExtractionResult) {
        self.key_value_pairs.extend(other.key_value_pairs);
        self.extracted_tests.extend(other.extracted_tests);
    }
}

/// One page's extraction, tagged with its 1-based page number.
///
/// `error` records why a page degraded to empty (model transport failure,
/// unparsable reply, render failure). It never aborts the request — the
/// HTTP surface intentionally presents a failed page and a genuinely empty
/// page the same way — but logs and library callers can tell them apart.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page: usize,
    pub data: ExtractionResult,
    pub error: Option<PageError>,
}

impl PageOutcome {
    /// An empty outcome for `page`, optionally recording the failure that
    /// produced it.
    pub fn empty(page: usize, error: Option<PageError>) -> Self {
        Self {
            page,
            data: ExtractionResult::default(),
            error,
        }
    }
}

/// Union-merge all pages into one combined result.
///
/// Pages are folded in order, so on key collision the later page's value
/// wins. A single page passes through verbatim.
pub fn combine(outcomes: Vec<PageOutcome>) -> ExtractionResult {
    let mut combined = ExtractionResult::default();
    for outcome in outcomes {
        combined.absorb(outcome.data);
    }
    combined
}
