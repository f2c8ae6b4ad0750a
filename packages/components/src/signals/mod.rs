mod keyword;
mod position;
mod sub_elements;
mod tag_name;

pub use keyword::KeywordSignal;
pub use position::PositionSignal;
pub use sub_elements::SubElementSignal;
pub use tag_name::TagNameSignal;

use pagewright_markup::{Dom, NodeId};
use serde::Serialize;

use crate::component::Position;

/// An element being scored, with its place among the body's elements
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub dom: &'a Dom,
    pub node: NodeId,
    /// Index among the body's element children, `None` when nested deeper
    pub top_level_index: Option<usize>,
    pub top_level_count: usize,
}

impl<'a> Candidate<'a> {
    pub fn new(dom: &'a Dom, node: NodeId) -> Self {
        let top_level = dom.element_children(dom.body());
        Self {
            dom,
            node,
            top_level_index: top_level.iter().position(|id| *id == node),
            top_level_count: top_level.len(),
        }
    }

    pub fn tag_name(&self) -> &str {
        self.dom.tag_name(self.node).unwrap_or_default()
    }

    pub fn is_first(&self) -> bool {
        self.top_level_index == Some(0)
    }

    pub fn is_last(&self) -> bool {
        self.top_level_count > 0 && self.top_level_index == Some(self.top_level_count - 1)
    }

    /// Descendant elements with the given tag
    pub fn count_descendants(&self, tag_name: &str) -> usize {
        self.dom
            .descendants(self.node)
            .into_iter()
            .filter(|id| self.dom.tag_name(*id) == Some(tag_name))
            .count()
    }
}

/// A pure scoring function contributing to a candidate's confidence
pub trait Signal {
    /// Unique identifier for this signal
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Upper bound of [`Signal::score`]
    fn max_score(&self) -> u32;

    /// Contribution of this signal for the candidate at `position`
    fn score(&self, candidate: &Candidate<'_>, position: Position) -> u32;
}

/// One signal's contribution to a detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalScore {
    pub signal: &'static str,
    pub score: u32,
}

/// Registry of the signals a classifier sums
pub struct SignalRegistry {
    signals: Vec<Box<dyn Signal + Send + Sync>>,
}

impl SignalRegistry {
    /// Create a new registry with all built-in signals
    pub fn new() -> Self {
        Self {
            signals: vec![
                Box::new(TagNameSignal),
                Box::new(PositionSignal),
                Box::new(KeywordSignal),
                Box::new(SubElementSignal),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            signals: Vec::new(),
        }
    }

    pub fn signals(&self) -> &[Box<dyn Signal + Send + Sync>] {
        &self.signals
    }

    pub fn add_signal(&mut self, signal: Box<dyn Signal + Send + Sync>) {
        self.signals.push(signal);
    }

    /// Run every signal, clamping each to its own bound
    pub fn evaluate(&self, candidate: &Candidate<'_>, position: Position) -> Vec<SignalScore> {
        self.signals
            .iter()
            .map(|signal| SignalScore {
                signal: signal.name(),
                score: signal.score(candidate, position).min(signal.max_score()),
            })
            .collect()
    }
}

impl Default for SignalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistry")
            .field(
                "signals",
                &self.signals.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
