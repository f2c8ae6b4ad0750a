//! # Global component detection
//!
//! Scores page elements as likely site headers and footers.
//!
//! Candidates are the body's top-level elements plus the first `header`
//! and `footer` anywhere in the document. Each candidate runs through every
//! registered [`Signal`](crate::signals::Signal); contributions are summed
//! and capped at 100. The best candidate per position is reported when it
//! reaches the threshold, with ties going to the earlier element.

use pagewright_markup::{address_of, outer_html, parse, Address, Dom, NodeId};
use serde::Serialize;
use tracing::debug;

use crate::component::Position;
use crate::signals::{Candidate, SignalRegistry, SignalScore};

pub const DEFAULT_THRESHOLD: u32 = 50;
pub const MAX_CONFIDENCE: u32 = 100;

/// A header or footer found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub position: Position,
    pub address: Address,
    pub markup: String,
    pub confidence: u32,
    pub signals: Vec<SignalScore>,
}

/// Detection results for both global positions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Detections {
    pub header: Option<Detection>,
    pub footer: Option<Detection>,
}

impl Detections {
    pub fn get(&self, position: Position) -> Option<&Detection> {
        match position {
            Position::Header => self.header.as_ref(),
            Position::Footer => self.footer.as_ref(),
            Position::Content => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.footer.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.header.iter().chain(self.footer.iter())
    }
}

#[derive(Debug)]
pub struct Classifier {
    registry: SignalRegistry,
    threshold: u32,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            registry: SignalRegistry::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_registry(mut self, registry: SignalRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Elements worth scoring, in document order
    fn candidates(&self, dom: &Dom) -> Vec<NodeId> {
        let mut candidates = dom.element_children(dom.body());
        for tag in ["header", "footer"] {
            if let Some(first) = dom.find_first(tag) {
                if !candidates.contains(&first) {
                    candidates.push(first);
                }
            }
        }

        let order = dom.elements();
        candidates.sort_by_key(|id| order.iter().position(|o| o == id));
        candidates
    }

    /// Score one element for one position, regardless of threshold
    pub fn score(&self, dom: &Dom, node: NodeId, position: Position) -> Option<Detection> {
        let address = address_of(dom, node)?;
        let signals = self.registry.evaluate(&Candidate::new(dom, node), position);
        let confidence = signals
            .iter()
            .map(|s| s.score)
            .sum::<u32>()
            .min(MAX_CONFIDENCE);

        Some(Detection {
            position,
            address,
            markup: outer_html(dom, node),
            confidence,
            signals,
        })
    }

    /// Best candidate for `position`, if it reaches the threshold
    pub fn detect(&self, dom: &Dom, position: Position) -> Option<Detection> {
        if !position.is_global() {
            return None;
        }

        let mut best: Option<Detection> = None;
        for node in self.candidates(dom) {
            let Some(detection) = self.score(dom, node, position) else {
                continue;
            };
            // Strictly greater keeps the earliest element on ties
            if best
                .as_ref()
                .map_or(true, |b| detection.confidence > b.confidence)
            {
                best = Some(detection);
            }
        }

        match best {
            Some(detection) if detection.confidence >= self.threshold => {
                debug!(
                    %position,
                    address = %detection.address,
                    confidence = detection.confidence,
                    "detected global component candidate"
                );
                Some(detection)
            }
            Some(detection) => {
                debug!(
                    %position,
                    confidence = detection.confidence,
                    threshold = self.threshold,
                    "best candidate below threshold"
                );
                None
            }
            None => None,
        }
    }

    pub fn classify(&self, dom: &Dom) -> Detections {
        let header = self.detect(dom, Position::Header);
        let mut footer = self.detect(dom, Position::Footer);

        // One element cannot be both
        if let (Some(h), Some(f)) = (&header, &footer) {
            if h.address == f.address {
                footer = None;
            }
        }

        Detections { header, footer }
    }

    pub fn classify_document(&self, document: &str) -> Detections {
        self.classify(&parse(document))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
