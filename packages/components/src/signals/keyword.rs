use crate::component::Position;
use crate::signals::{Candidate, Signal};

const HEADER_KEYWORDS: &[&str] = &["header", "nav", "navbar", "menu", "masthead", "topbar"];
const FOOTER_KEYWORDS: &[&str] = &["footer", "copyright", "site-footer"];

/// Naming hints in `class`, `id` and `role`
pub struct KeywordSignal;

impl KeywordSignal {
    fn matches(token: &str, keywords: &[&str]) -> bool {
        let token = token.to_ascii_lowercase();
        keywords.contains(&token.as_str())
            || token
                .split(|c| c == '-' || c == '_')
                .any(|part| keywords.contains(&part))
    }
}

impl Signal for KeywordSignal {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn description(&self) -> &'static str {
        "Class, id or ARIA role names the element as a header or footer"
    }

    fn max_score(&self) -> u32 {
        15
    }

    fn score(&self, candidate: &Candidate<'_>, position: Position) -> u32 {
        let (keywords, role) = match position {
            Position::Header => (HEADER_KEYWORDS, "banner"),
            Position::Footer => (FOOTER_KEYWORDS, "contentinfo"),
            Position::Content => return 0,
        };
        let Some(element) = candidate.dom.element(candidate.node) else {
            return 0;
        };

        if element
            .attr("role")
            .is_some_and(|r| r.trim().eq_ignore_ascii_case(role))
        {
            return 15;
        }

        let named = element
            .classes()
            .iter()
            .map(String::as_str)
            .chain(element.attr("id"))
            .any(|token| Self::matches(token, keywords));

        if named {
            15
        } else {
            0
        }
    }
}
