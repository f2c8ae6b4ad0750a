use crate::component::Position;
use crate::signals::{Candidate, Signal};

/// First or last top-level element of the body
pub struct PositionSignal;

impl Signal for PositionSignal {
    fn name(&self) -> &'static str {
        "position"
    }

    fn description(&self) -> &'static str {
        "Element opens (header) or closes (footer) the page body"
    }

    fn max_score(&self) -> u32 {
        25
    }

    fn score(&self, candidate: &Candidate<'_>, position: Position) -> u32 {
        let placed = match position {
            Position::Header => candidate.is_first(),
            Position::Footer => candidate.is_last(),
            Position::Content => false,
        };
        if placed {
            25
        } else {
            0
        }
    }
}
