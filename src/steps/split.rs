//! Individual-element extraction.
//!
//! Some nodes map to exactly one semantic element; others are containers
//! wrapping several logical paragraphs behind one root tag. A chain of
//! single-element checks decides which: each check answers yes (definitely
//! one element), no (must split), or defers to the next check. When every
//! check defers, the node is treated as a single element. Split nodes become
//! Composite elements whose children are fresh Unclassified elements,
//! themselves re-checked recursively.

use crate::Result;
use crate::element::{ElementCategory, SemanticElement};
use crate::html_tag::HtmlTag;
use crate::steps::sections::{ITEM_PATTERN, PART_PATTERN};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};

/// One link in the single-element check chain.
pub trait SingleElementCheck {
    fn name(&self) -> &'static str;

    /// `Some(true)` - one element; `Some(false)` - must split; `None` -
    /// defer to the next check.
    fn contains_single_element(&self, tag: &HtmlTag) -> Option<bool>;
}

/// Inline-XBRL wrappers are opaque metadata blobs; never split them.
struct XbrlCheck;

impl SingleElementCheck for XbrlCheck {
    fn name(&self) -> &'static str {
        "xbrl"
    }

    fn contains_single_element(&self, tag: &HtmlTag) -> Option<bool> {
        if tag.name().starts_with("ix:") {
            return Some(true);
        }
        None
    }
}

/// A block whose only content is images stays whole.
struct ImageCheck;

impl SingleElementCheck for ImageCheck {
    fn name(&self) -> &'static str {
        "image"
    }

    fn contains_single_element(&self, tag: &HtmlTag) -> Option<bool> {
        if tag.contains_tag("img", true) && tag.text().is_empty() {
            return Some(true);
        }
        None
    }
}

/// A node wrapping exactly one table and nothing else is one element; a
/// table with prose siblings (or several tables) must be split apart.
struct TableCheck;

impl SingleElementCheck for TableCheck {
    fn name(&self) -> &'static str {
        "table"
    }

    fn contains_single_element(&self, tag: &HtmlTag) -> Option<bool> {
        match tag.count_tags("table") {
            0 => None,
            1 => {
                let table = tag.find_tag("table")?;
                Some(table.text() == tag.text())
            }
            _ => Some(false),
        }
    }
}

/// A node that leads with a Part/Item heading but contains more than the
/// heading must split, so the section title becomes its own element.
struct SectionTitleCheck;

impl SingleElementCheck for SectionTitleCheck {
    fn name(&self) -> &'static str {
        "section-title"
    }

    fn contains_single_element(&self, tag: &HtmlTag) -> Option<bool> {
        let text = tag.text();
        if !starts_with_section_pattern(text) {
            return None;
        }
        if let Some(first) = tag.children().first()
            && starts_with_section_pattern(first.text())
            && first.text() != text
        {
            return Some(false);
        }
        Some(true)
    }
}

fn starts_with_section_pattern(text: &str) -> bool {
    PART_PATTERN.is_match(text) || ITEM_PATTERN.is_match(text)
}

/// Splits container nodes into Composite elements.
pub struct SplitStep {
    guard: RunGuard,
    checks: Vec<Box<dyn SingleElementCheck>>,
}

impl SplitStep {
    pub fn new() -> Self {
        SplitStep::with_checks(vec![
            Box::new(XbrlCheck),
            Box::new(ImageCheck),
            Box::new(TableCheck),
            Box::new(SectionTitleCheck),
        ])
    }

    /// Custom check chain, evaluated in order.
    pub fn with_checks(checks: Vec<Box<dyn SingleElementCheck>>) -> Self {
        SplitStep {
            guard: RunGuard::default(),
            checks,
        }
    }

    fn split_recursive(&self, element: SemanticElement) -> Result<SemanticElement> {
        let tag = element.tag().clone();
        // Nodes without several tag children, and nodes with loose text
        // between children, stay whole.
        if tag.children().len() < 2 || tag.has_loose_text() {
            return Ok(element);
        }

        let verdict = self
            .checks
            .iter()
            .find_map(|check| check.contains_single_element(&tag).map(|v| (check.name(), v)));

        let check_name = match verdict {
            Some((_, true)) | None => return Ok(element),
            Some((name, false)) => name,
        };

        let children = tag
            .children()
            .iter()
            .map(|child| {
                let mut child = SemanticElement::unclassified(child.clone());
                child.record("split", "extracted from a multi-element node");
                self.split_recursive(child)
            })
            .collect::<Result<Vec<_>>>()?;

        let (_, tag, mut log) = element.into_parts();
        log.record(
            "split",
            format!("split into {} elements ({check_name} check)", children.len()),
        );
        SemanticElement::composite(tag, children, log)
    }
}

impl Default for SplitStep {
    fn default() -> Self {
        SplitStep::new()
    }
}

impl ElementwiseStep for SplitStep {
    fn name(&self) -> &'static str {
        "split"
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
        self.split_recursive(element)
    }
}
