//! Fallback text classification.

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};

/// Classifies any remaining Unclassified element with text as plain Text.
/// Runs late, after every more specific heuristic has had its chance.
#[derive(Debug, Default)]
pub struct TextClassifyStep {
    guard: RunGuard,
}

impl TextClassifyStep {
    pub fn new() -> Self {
        TextClassifyStep::default()
    }
}

impl ElementwiseStep for TextClassifyStep {
    fn name(&self) -> &'static str {
        "text"
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
        if element.text().is_empty() {
            return Ok(element);
        }
        Ok(element.reclassify(ElementKind::Text, "text", "classified as prose"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::ProcessingStep;
    use crate::steps::tests::elements_from;

    #[test]
    fn nonempty_unclassified_becomes_text() {
        let mut step = TextClassifyStep::new();
        let elements = step
            .process(elements_from("<p>Revenue grew modestly.</p><p></p>"))
            .unwrap();
        assert_eq!(elements[0].category(), ElementCategory::Text);
        assert_eq!(elements[1].category(), ElementCategory::Unclassified);
    }
}
