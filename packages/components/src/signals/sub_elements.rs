use std::sync::OnceLock;

use regex::Regex;

use crate::component::Position;
use crate::signals::{Candidate, Signal};

fn copyright_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)©|&copy;|&#169;|&#xa9;|\bcopyright\b|\(c\)\s*\d{4}").expect("static regex")
    })
}

/// Typical contents: navigation and links up top, copyright and link
/// lists at the bottom
pub struct SubElementSignal;

impl SubElementSignal {
    fn has_link_list(candidate: &Candidate<'_>) -> bool {
        let dom = candidate.dom;
        let list_of_links = dom
            .descendants(candidate.node)
            .into_iter()
            .filter(|id| matches!(dom.tag_name(*id), Some("ul") | Some("ol")))
            .any(|list| {
                dom.descendants(list)
                    .into_iter()
                    .any(|id| dom.tag_name(id) == Some("a"))
            });
        list_of_links || candidate.count_descendants("a") >= 2
    }
}

impl Signal for SubElementSignal {
    fn name(&self) -> &'static str {
        "sub-elements"
    }

    fn description(&self) -> &'static str {
        "Element contains navigation, links or copyright text"
    }

    fn max_score(&self) -> u32 {
        20
    }

    fn score(&self, candidate: &Candidate<'_>, position: Position) -> u32 {
        match position {
            Position::Header => {
                let mut score = 0;
                if candidate.count_descendants("nav") > 0 {
                    score += 10;
                }
                if candidate.count_descendants("a") >= 2 {
                    score += 10;
                }
                score
            }
            Position::Footer => {
                let mut score = 0;
                if copyright_re().is_match(&candidate.dom.text_content(candidate.node)) {
                    score += 10;
                }
                if Self::has_link_list(candidate) {
                    score += 10;
                }
                score
            }
            Position::Content => 0,
        }
    }
}
