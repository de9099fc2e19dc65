//! Adjacent text merging.
//!
//! Filing markup often splits one logical sentence across adjacent inline
//! tags. This batch step collapses every run of two or more consecutive
//! Text elements into a single Text element whose tag is a synthetic
//! container holding the originals in order. It is the only step that
//! changes the length of the element list.

use crate::Result;
use crate::dom::Node;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::html_tag::HtmlTag;
use crate::steps::{ProcessingStep, RunGuard};

#[derive(Debug, Default)]
pub struct TextMergeStep {
    guard: RunGuard,
}

impl TextMergeStep {
    pub fn new() -> Self {
        TextMergeStep::default()
    }

    fn flush(run: &mut Vec<SemanticElement>, out: &mut Vec<SemanticElement>) {
        if run.len() < 2 {
            out.append(run);
            return;
        }

        let nodes = run
            .iter()
            .map(|element| element.tag().node().clone())
            .collect();
        let tag = HtmlTag::new(Node::synthetic_container(nodes));

        let count = run.len();
        let first = run.remove(0);
        let (_, _, mut log) = first.into_parts();
        log.record("merge", format!("merged {count} adjacent text elements"));
        run.clear();

        out.push(SemanticElement::from_parts(ElementKind::Text, tag, log));
    }
}

impl ProcessingStep for TextMergeStep {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn process(&mut self, elements: Vec<SemanticElement>) -> Result<Vec<SemanticElement>> {
        self.guard.arm("merge")?;

        let mut out = Vec::with_capacity(elements.len());
        let mut run: Vec<SemanticElement> = Vec::new();
        for element in elements {
            if element.category() == ElementCategory::Text {
                run.push(element);
            } else {
                TextMergeStep::flush(&mut run, &mut out);
                out.push(element);
            }
        }
        TextMergeStep::flush(&mut run, &mut out);
        Ok(out)
    }
}
