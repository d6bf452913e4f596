//! Latest scan result per target.

use std::collections::HashMap;

use blue_token::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobId;

/// A worker's report for one scanned target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Worker that submitted the result.
    pub worker: Address,
    /// Free-form score payload, e.g. `score_1=35;score_2=3443;`.
    pub score: String,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// Job the result was submitted for.
    pub job: JobId,
}

/// Results keyed by scanned target. A submission replaces the previous one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResultStore {
    results: HashMap<Address, ScanResult>,
}

impl ScanResultStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` for `target`, returning the result it replaced.
    pub fn record(&mut self, target: Address, result: ScanResult) -> Option<ScanResult> {
        self.results.insert(target, result)
    }

    /// Latest result for `target`, if any was ever submitted.
    #[must_use]
    pub fn get(&self, target: &Address) -> Option<&ScanResult> {
        self.results.get(target)
    }

    /// Number of targets with a result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no result was ever submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
