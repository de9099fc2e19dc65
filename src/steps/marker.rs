//! Footnote and bulletpoint detection.
//!
//! Looks at the marker token at the head of a node's deepest single-child
//! chain. A numeric marker (optional trailing period) makes the element a
//! Footnote; a single non-alphanumeric symbol makes it a Bulletpoint whose
//! level follows the first-seen order of the symbol, starting at 1.

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::html_tag::HtmlTag;
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};

const MAX_MARKER_LEN: usize = 4;

#[derive(Debug, Default)]
pub struct MarkerStep {
    guard: RunGuard,
    /// Bullet symbols in first-seen order; level is 1 + index.
    symbols: Vec<char>,
}

impl MarkerStep {
    pub fn new() -> Self {
        MarkerStep::default()
    }

    fn bullet_level(&mut self, symbol: char) -> u32 {
        match self.symbols.iter().position(|s| *s == symbol) {
            Some(index) => index as u32 + 1,
            None => {
                self.symbols.push(symbol);
                self.symbols.len() as u32
            }
        }
    }
}

/// The marker token: the text of the chain's end node, or of its first
/// child when the chain ends in a multi-child node.
fn marker_token(tag: &HtmlTag) -> Option<String> {
    let deepest = tag.first_deepest_tag();
    let children = deepest.children();
    let marker = match children.first() {
        Some(first) => first.text(),
        None => deepest.text(),
    };
    if marker.is_empty() || marker.chars().count() > MAX_MARKER_LEN {
        return None;
    }
    Some(marker.to_string())
}

fn is_footnote_marker(token: &str) -> bool {
    let digits = token.strip_suffix('.').unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn bullet_symbol(token: &str) -> Option<char> {
    let mut chars = token.chars();
    let symbol = chars.next()?;
    if chars.next().is_some() || symbol.is_alphanumeric() {
        return None;
    }
    Some(symbol)
}

impl ElementwiseStep for MarkerStep {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn guard(&mut self) -> &mut RunGuard {
        &mut self.guard
    }

    fn filter(&self) -> StepFilter {
        StepFilter::only(vec![ElementCategory::Unclassified])
    }

    fn process_element(
        &mut self,
        element: SemanticElement,
        _ctx: &StepContext,
    ) -> Result<SemanticElement> {
        let Some(token) = marker_token(element.tag()) else {
            return Ok(element);
        };
        // The marker must be followed by content; a node that is nothing but
        // a short number is page furniture, not a footnote.
        if token == element.text() {
            return Ok(element);
        }

        if is_footnote_marker(&token) {
            return Ok(element.reclassify(
                ElementKind::Footnote,
                "marker",
                format!("footnote marker {token:?}"),
            ));
        }

        if let Some(symbol) = bullet_symbol(&token) {
            let level = self.bullet_level(symbol);
            let kind = ElementKind::bulletpoint(level)?;
            return Ok(element.reclassify(
                kind,
                "marker",
                format!("bullet symbol {symbol:?}, level {level}"),
            ));
        }

        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::ProcessingStep;
    use crate::steps::tests::elements_from;

    fn run(html: &str) -> Vec<SemanticElement> {
        MarkerStep::new().process(elements_from(html)).unwrap()
    }

    #[test]
    fn numeric_marker_makes_footnote() {
        let elements = run(
            "<div><span>1.</span><span>Refer to the accompanying notes.</span></div>",
        );
        assert_eq!(elements[0].category(), ElementCategory::Footnote);
    }

    #[test]
    fn bullet_levels_follow_first_seen_symbols() {
        let elements = run(
            "<div><p><span>•</span><span>first style</span></p></div>\
             <div><p><span>-</span><span>second style</span></p></div>\
             <div><p><span>•</span><span>first again</span></p></div>",
        );
        assert_eq!(
            elements.iter().map(|e| e.level()).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(1)]
        );
    }

    #[test]
    fn bare_number_is_not_a_footnote() {
        let elements = run("<p>23.</p>");
        assert_eq!(elements[0].category(), ElementCategory::Unclassified);
    }

    #[test]
    fn word_markers_are_ignored() {
        let elements = run("<div><span>Note</span><span>something else</span></div>");
        assert_eq!(elements[0].category(), ElementCategory::Unclassified);
    }
}
