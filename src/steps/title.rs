//! Title ranking.
//!
//! Converts Highlighted elements into Titles. The level is the first-seen
//! index of the element's distinct style: the first unique style in the
//! document becomes level 0, on the assumption that earlier prominent
//! styles correspond to higher-level headings. This is a heuristic, not a
//! guarantee.

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};
use crate::style::TextStyle;

#[derive(Debug, Default)]
pub struct TitleStep {
    guard: RunGuard,
    /// Distinct styles in first-seen order; index is the title level.
    seen: Vec<TextStyle>,
}

impl TitleStep {
    pub fn new() -> Self {
        TitleStep::default()
    }

    fn level_for(&mut self, style: TextStyle) -> u32 {
        match self.seen.iter().position(|s| *s == style) {
            Some(index) => index as u32,
            None => {
                self.seen.push(style);
                (self.seen.len() - 1) as u32
            }
        }
    }
}

impl ElementwiseStep for TitleStep {
    fn name(&self) -> &'static str {
        "title"
    }

    fn guard(&mut self) -> &mut RunGuard {
        &mut self.guard
    }

    fn filter(&self) -> StepFilter {
        StepFilter::only(vec![ElementCategory::Highlighted])
    }

    fn process_element(
        &mut self,
        element: SemanticElement,
        _ctx: &StepContext,
    ) -> Result<SemanticElement> {
        let ElementKind::Highlighted(style) = element.kind() else {
            return Ok(element);
        };
        let level = self.level_for(*style);
        Ok(element.reclassify(
            ElementKind::Title { level },
            "title",
            format!("title level {level}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::tests::elements_from;
    use crate::steps::{HighlightStep, ProcessingStep};

    fn titles(html: &str) -> Vec<(String, Option<u32>)> {
        let elements = HighlightStep::new().process(elements_from(html)).unwrap();
        let elements = TitleStep::new().process(elements).unwrap();
        elements
            .into_iter()
            .map(|e| (e.text().to_string(), e.level()))
            .collect()
    }

    #[test]
    fn levels_follow_first_seen_style_order() {
        let result = titles(
            r#"<p style="font-weight: bold">Overview</p>
               <p style="font-style: italic">Background</p>
               <p style="font-weight: bold">Liquidity</p>"#,
        );
        assert_eq!(
            result,
            vec![
                ("Overview".to_string(), Some(0)),
                ("Background".to_string(), Some(1)),
                ("Liquidity".to_string(), Some(0)),
            ]
        );
    }

    #[test]
    fn plain_text_is_ignored() {
        let result = titles("<p>just prose</p>");
        assert_eq!(result, vec![("just prose".to_string(), None)]);
    }
}
