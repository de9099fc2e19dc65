//! Table and image detection.
//!
//! Both steps apply the same two-part test: the node must be a unary tree
//! (atomic block) and must contain the marker tag somewhere inside.
//! Atomicity is checked first: a non-unary node holding a table alongside
//! other prose must not be swallowed whole; the split step takes it apart
//! instead.

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};

/// Classifies atomic blocks wrapping a `<table>`.
#[derive(Debug, Default)]
pub struct TableStep {
    guard: RunGuard,
}

impl TableStep {
    pub fn new() -> Self {
        TableStep::default()
    }
}

impl ElementwiseStep for TableStep {
    fn name(&self) -> &'static str {
        "table"
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
        let tag = element.tag();
        if tag.is_unary_tree() && tag.contains_tag("table", true) {
            return Ok(element.reclassify(ElementKind::Table, "table", "atomic block contains <table>"));
        }
        Ok(element)
    }
}

/// Classifies atomic blocks wrapping an `<img>`.
#[derive(Debug, Default)]
pub struct ImageStep {
    guard: RunGuard,
}

impl ImageStep {
    pub fn new() -> Self {
        ImageStep::default()
    }
}

impl ElementwiseStep for ImageStep {
    fn name(&self) -> &'static str {
        "image"
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
        let tag = element.tag();
        if tag.is_unary_tree() && tag.contains_tag("img", true) {
            return Ok(element.reclassify(ElementKind::Image, "image", "atomic block contains <img>"));
        }
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::ProcessingStep;
    use crate::steps::tests::elements_from;

    #[test]
    fn wrapped_table_is_detected() {
        let mut step = TableStep::new();
        let elements = step
            .process(elements_from(
                "<div><table><tr><td>Revenue</td><td>$10</td></tr></table></div>",
            ))
            .unwrap();
        assert_eq!(elements[0].category(), ElementCategory::Table);
    }

    #[test]
    fn table_beside_prose_is_left_alone() {
        let mut step = TableStep::new();
        let elements = step
            .process(elements_from(
                "<div><p>See the table below.</p><table><tr><td>x</td></tr></table></div>",
            ))
            .unwrap();
        assert_eq!(elements[0].category(), ElementCategory::Unclassified);
    }

    #[test]
    fn image_block_is_detected() {
        let mut step = ImageStep::new();
        let elements = step
            .process(elements_from(r#"<div><img src="chart.png"></div>"#))
            .unwrap();
        assert_eq!(elements[0].category(), ElementCategory::Image);
    }

    #[test]
    fn plain_paragraph_is_untouched() {
        let mut step = TableStep::new();
        let elements = step.process(elements_from("<p>prose</p>")).unwrap();
        assert_eq!(elements[0].category(), ElementCategory::Unclassified);
    }
}
