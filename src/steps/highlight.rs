//! Highlighted-text detection.

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};
use crate::style::{PREVALENCE_THRESHOLD, TextStyle};

/// Tags elements whose text is predominantly emphasized (bold, italic,
/// centered, underlined, or uppercase) as Highlighted.
#[derive(Debug)]
pub struct HighlightStep {
    guard: RunGuard,
    threshold: f64,
}

impl HighlightStep {
    pub fn new() -> Self {
        HighlightStep::with_threshold(PREVALENCE_THRESHOLD)
    }

    /// Custom prevalence threshold (percent of characters).
    pub fn with_threshold(threshold: f64) -> Self {
        HighlightStep {
            guard: RunGuard::default(),
            threshold,
        }
    }
}

impl Default for HighlightStep {
    fn default() -> Self {
        HighlightStep::new()
    }
}

impl ElementwiseStep for HighlightStep {
    fn name(&self) -> &'static str {
        "highlight"
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
        let style = TextStyle::detect(
            element.tag().text_styles_metrics(),
            element.text(),
            self.threshold,
        );
        if style.is_plain() {
            return Ok(element);
        }
        Ok(element.reclassify(
            ElementKind::Highlighted(style),
            "highlight",
            "predominantly emphasized text",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::ProcessingStep;
    use crate::steps::tests::elements_from;

    fn style_of(element: &SemanticElement) -> TextStyle {
        match element.kind() {
            ElementKind::Highlighted(style) => *style,
            other => panic!("expected highlighted, got {other:?}"),
        }
    }

    #[test]
    fn fully_bold_paragraph_is_highlighted() {
        let mut step = HighlightStep::new();
        let elements = step
            .process(elements_from(
                r#"<p style="font-weight: 700">Controls and Procedures</p>"#,
            ))
            .unwrap();
        assert!(style_of(&elements[0]).bold);
    }

    #[test]
    fn partially_bold_paragraph_is_not() {
        let mut step = HighlightStep::new();
        let elements = step
            .process(elements_from(
                r#"<p><b style="font-weight: bold">Note:</b> the rest of this sentence is much longer than the emphasized part</p>"#,
            ))
            .unwrap();
        assert_eq!(elements[0].category(), ElementCategory::Unclassified);
    }

    #[test]
    fn uppercase_text_is_highlighted_without_css() {
        let mut step = HighlightStep::new();
        let elements = step
            .process(elements_from("<p>RISK FACTORS</p>"))
            .unwrap();
        assert!(style_of(&elements[0]).all_uppercase);
    }

    #[test]
    fn centered_and_underlined_flags_combine() {
        let mut step = HighlightStep::new();
        let elements = step
            .process(elements_from(
                r#"<div style="text-align: center"><span style="text-decoration: underline">Signatures</span></div>"#,
            ))
            .unwrap();
        let style = style_of(&elements[0]);
        assert!(style.centered);
        assert!(style.underline);
        assert!(!style.bold);
    }
}
