//! Empty-element pruning.

use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};
use crate::Result;

/// Marks nodes with no extractable words as Empty.
///
/// Runs first so later heuristics never waste work on spacer rows and
/// decorative markup.
#[derive(Debug, Default)]
pub struct PruneStep {
    guard: RunGuard,
}

impl PruneStep {
    pub fn new() -> Self {
        PruneStep::default()
    }
}

impl ElementwiseStep for PruneStep {
    fn name(&self) -> &'static str {
        "prune"
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
        if element.text().chars().any(char::is_alphanumeric) {
            return Ok(element);
        }
        Ok(element.reclassify(ElementKind::Empty, "prune", "no extractable words"))
    }
}
