//! # Soft failures
//!
//! Failures the engine recovers from on its own (a stale address, an
//! unreadable response, an edit that changed nothing) are counted here
//! instead of surfacing as errors. Once one kind repeats often enough the
//! UI offers a single retry carrying the last raw text.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    AddressMiss,
    PatchParse,
    MutationNoop,
    Generation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryAffordance {
    pub kind: FailureKind,
    pub count: usize,
    pub last_raw: Option<String>,
}

#[derive(Debug, Default)]
struct Tally {
    count: usize,
    last_raw: Option<String>,
}

#[derive(Debug)]
pub struct SoftFailures {
    threshold: usize,
    tallies: HashMap<FailureKind, Tally>,
    last_kind: Option<FailureKind>,
}

impl SoftFailures {
    /// `threshold` repeated failures of a kind produce a retry affordance
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            tallies: HashMap::new(),
            last_kind: None,
        }
    }

    pub fn record(&mut self, kind: FailureKind, raw: Option<&str>) {
        let tally = self.tallies.entry(kind).or_default();
        tally.count += 1;
        if let Some(raw) = raw {
            tally.last_raw = Some(raw.to_string());
        }
        self.last_kind = Some(kind);
        warn!(?kind, count = tally.count, "soft failure");
    }

    /// A success of `kind` resets its count
    pub fn succeed(&mut self, kind: FailureKind) {
        self.tallies.remove(&kind);
        if self.last_kind == Some(kind) {
            self.last_kind = None;
        }
    }

    pub fn count(&self, kind: FailureKind) -> usize {
        self.tallies.get(&kind).map_or(0, |t| t.count)
    }

    /// Retry offer for the most recent failing kind, once it has repeated
    pub fn retry_affordance(&self) -> Option<RetryAffordance> {
        let kind = self.last_kind?;
        let tally = self.tallies.get(&kind)?;
        (tally.count >= self.threshold).then(|| RetryAffordance {
            kind,
            count: tally.count,
            last_raw: tally.last_raw.clone(),
        })
    }

    pub fn clear(&mut self) {
        self.tallies.clear();
        self.last_kind = None;
    }
}

impl Default for SoftFailures {
    fn default() -> Self {
        Self::new(2)
    }
}
