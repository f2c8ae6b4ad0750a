use crate::component::Position;
use crate::signals::{Candidate, Signal};

/// Semantic landmark tags
pub struct TagNameSignal;

impl Signal for TagNameSignal {
    fn name(&self) -> &'static str {
        "tag-name"
    }

    fn description(&self) -> &'static str {
        "Element is a <header>, <nav> or <footer> landmark"
    }

    fn max_score(&self) -> u32 {
        40
    }

    fn score(&self, candidate: &Candidate<'_>, position: Position) -> u32 {
        match (position, candidate.tag_name()) {
            (Position::Header, "header") => 40,
            (Position::Header, "nav") => 20,
            (Position::Footer, "footer") => 40,
            _ => 0,
        }
    }
}
