//! Classification pipeline.
//!
//! A parse run executes a fresh instance of each configured step, in a fixed
//! order, against the full element list. Steps are narrow and composable;
//! order matters because later steps rely on the types earlier steps
//! produce.
//!
//! ## Default order
//!
//! 1. **Prune** - nodes with no extractable words become Empty
//! 2. **Table** / 3. **Image** - atomic blocks, unary-tree test first
//! 4. **Split** - one node holding several logical elements becomes Composite
//! 5. **Highlight** - predominantly styled text becomes Highlighted
//! 6. **Title** - Highlighted elements ranked into Title levels
//! 7. **Sections** - canonical Part/Item section starts (two passes)
//! 8. **Marker** - footnote and bulletpoint markers
//! 9. **PageMeta** - recurring page numbers/headers become Irrelevant (two
//!    passes)
//! 10. **TextClassify** - remaining Unclassified prose becomes Text
//! 11. **Merge** - adjacent Text runs collapse into one element

mod highlight;
mod marker;
mod merge;
mod page_meta;
mod prune;
mod sections;
mod split;
mod table_image;
mod text_classify;
mod title;

pub use highlight::HighlightStep;
pub use marker::MarkerStep;
pub use merge::TextMergeStep;
pub use page_meta::PageMetaStep;
pub use prune::PruneStep;
pub use sections::TopSectionStep;
pub use split::{SingleElementCheck, SplitStep};
pub use table_image::{ImageStep, TableStep};
pub use text_classify::TextClassifyStep;
pub use title::TitleStep;

use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::section::FormType;
use crate::{Error, Result};

/// One transformation over the whole element list.
///
/// Implementations hold per-document state; a fresh instance is required for
/// every parse and re-use is a hard error.
pub trait ProcessingStep {
    /// Step name for logs and error elements.
    fn name(&self) -> &'static str;

    /// Transform the element list. Order must be preserved; only batch steps
    /// like the text merger may change the list's length.
    fn process(&mut self, elements: Vec<SemanticElement>) -> Result<Vec<SemanticElement>>;
}

/// The default step sequence for a form type.
pub fn default_steps(form: FormType) -> Vec<Box<dyn ProcessingStep>> {
    vec![
        Box::new(PruneStep::new()),
        Box::new(TableStep::new()),
        Box::new(ImageStep::new()),
        Box::new(SplitStep::new()),
        Box::new(HighlightStep::new()),
        Box::new(TitleStep::new()),
        Box::new(TopSectionStep::new(form)),
        Box::new(MarkerStep::new()),
        Box::new(PageMetaStep::new()),
        Box::new(TextClassifyStep::new()),
        Box::new(TextMergeStep::new()),
    ]
}

// ============================================================================
// Re-use guard
// ============================================================================

/// Single-use latch guarding per-document step state.
///
/// Steps accumulate counters and candidate lists scoped to one document;
/// running the same instance against a second document would leak that state,
/// so the second `process` call fails before touching any element.
#[derive(Debug, Default)]
pub struct RunGuard {
    spent: bool,
}

impl RunGuard {
    pub fn arm(&mut self, step: &'static str) -> Result<()> {
        if self.spent {
            return Err(Error::StepReused(step.to_string()));
        }
        self.spent = true;
        Ok(())
    }
}

// ============================================================================
// Step filters
// ============================================================================

/// Which element categories a step processes.
///
/// An empty process list means "all categories". Error elements are never
/// processed; Composite elements are handled by recursion in the driver.
#[derive(Debug, Clone, Default)]
pub struct StepFilter {
    process: Vec<ElementCategory>,
    exclude: Vec<ElementCategory>,
}

impl StepFilter {
    /// Process every category (except Error).
    pub fn all() -> Self {
        StepFilter::default()
    }

    /// Process only the given categories.
    pub fn only(process: impl Into<Vec<ElementCategory>>) -> Self {
        StepFilter {
            process: process.into(),
            exclude: Vec::new(),
        }
    }

    /// Process everything except the given categories.
    pub fn all_except(exclude: impl Into<Vec<ElementCategory>>) -> Self {
        StepFilter {
            process: Vec::new(),
            exclude: exclude.into(),
        }
    }

    /// Explicit process and exclude sets. A category in both sets is a
    /// configuration bug and fails immediately.
    pub fn new(
        process: impl Into<Vec<ElementCategory>>,
        exclude: impl Into<Vec<ElementCategory>>,
    ) -> Result<Self> {
        let process = process.into();
        let exclude = exclude.into();
        if let Some(overlap) = process.iter().find(|c| exclude.contains(c)) {
            return Err(Error::FilterOverlap(overlap.to_string()));
        }
        Ok(StepFilter { process, exclude })
    }

    pub fn accepts(&self, category: ElementCategory) -> bool {
        if category == ElementCategory::Error || self.exclude.contains(&category) {
            return false;
        }
        self.process.is_empty() || self.process.contains(&category)
    }
}

// ============================================================================
// Elementwise driver
// ============================================================================

/// Position within a multi-pass step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    /// Zero-based pass index.
    pub pass: usize,
    /// Total passes this step runs.
    pub passes: usize,
}

impl StepContext {
    pub fn is_last_pass(&self) -> bool {
        self.pass + 1 == self.passes
    }
}

/// A step defined element-by-element.
///
/// The blanket [`ProcessingStep`] impl supplies filtering, multi-pass
/// iteration, Composite recursion, the re-use guard, and per-element fault
/// isolation, so concrete steps only decide what one element becomes.
pub trait ElementwiseStep {
    fn name(&self) -> &'static str;

    fn guard(&mut self) -> &mut RunGuard;

    fn filter(&self) -> StepFilter;

    /// Number of passes over the whole list. Later passes may rely on
    /// aggregate state collected in earlier ones.
    fn passes(&self) -> usize {
        1
    }

    /// Hook invoked before each pass, with the list as it currently stands.
    fn begin_pass(&mut self, _elements: &[SemanticElement], _pass: usize) {}

    /// Produce the element's replacement (or the element unchanged). An Err
    /// is converted to an Error element; it never aborts the batch.
    fn process_element(
        &mut self,
        element: SemanticElement,
        ctx: &StepContext,
    ) -> Result<SemanticElement>;
}

impl<T: ElementwiseStep> ProcessingStep for T {
    fn name(&self) -> &'static str {
        ElementwiseStep::name(self)
    }

    fn process(&mut self, mut elements: Vec<SemanticElement>) -> Result<Vec<SemanticElement>> {
        let name = ElementwiseStep::name(self);
        self.guard().arm(name)?;

        let passes = self.passes();
        for pass in 0..passes {
            self.begin_pass(&elements, pass);
            let ctx = StepContext { pass, passes };
            elements = elements
                .into_iter()
                .map(|element| apply(self, element, &ctx))
                .collect();
        }
        Ok(elements)
    }
}

/// Run one element through a step, recursing into Composite children.
fn apply<T: ElementwiseStep + ?Sized>(
    step: &mut T,
    element: SemanticElement,
    ctx: &StepContext,
) -> SemanticElement {
    let (kind, tag, log) = element.into_parts();

    if let ElementKind::Composite(children) = kind {
        let children = children
            .into_iter()
            .map(|child| apply(step, child, ctx))
            .collect();
        return SemanticElement::from_parts(ElementKind::Composite(children), tag, log);
    }

    let element = SemanticElement::from_parts(kind, tag, log);
    if !step.filter().accepts(element.category()) {
        return element;
    }

    let backup = element.clone();
    let name = ElementwiseStep::name(step);
    match step.process_element(element, ctx) {
        Ok(replacement) => replacement,
        Err(error) => {
            log::warn!("step {name} failed on an element: {error}");
            backup.into_error(name, &error)
        }
    }
}
