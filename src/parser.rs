//! Parsing facade.

use crate::element::{ElementKind, SemanticElement};
use crate::html_tag::HtmlTag;
use crate::section::FormType;
use crate::steps::{ProcessingStep, default_steps};
use crate::tree::{SemanticTree, TreeBuilder};
use crate::{Error, Result, dom};

/// Produces a fresh step list for each parse, so per-document step state
/// can never leak between documents.
pub type StepFactory = Box<dyn Fn() -> Vec<Box<dyn ProcessingStep>>>;

/// The library's entry point: HTML in, classified elements (or a section
/// tree) out.
///
/// ```
/// use secant::{FormType, Parser};
///
/// let html = "<p>Part I</p><p>Item 1. Financial Statements</p><p>Prose.</p>";
/// let parser = Parser::for_form(FormType::TenQ);
///
/// let elements = parser.parse(html).unwrap();
/// assert_eq!(elements.len(), 3);
///
/// let tree = parser.parse_to_tree(html).unwrap();
/// assert_eq!(tree.roots().len(), 1);
/// ```
pub struct Parser {
    factory: StepFactory,
    keep_composites: bool,
}

impl Parser {
    /// Parser with the default step sequence for a form type.
    pub fn for_form(form: FormType) -> Self {
        Parser {
            factory: Box::new(move || default_steps(form)),
            keep_composites: false,
        }
    }

    /// Parser with a custom step factory. Swap, extend or remove individual
    /// steps without touching the pipeline engine.
    pub fn with_steps<F>(factory: F) -> Self
    where
        F: Fn() -> Vec<Box<dyn ProcessingStep>> + 'static,
    {
        Parser {
            factory: Box::new(factory),
            keep_composites: false,
        }
    }

    /// Keep Composite containers in the output instead of flattening them
    /// into their children. Useful for visualization tooling.
    pub fn keep_composites(mut self, keep: bool) -> Self {
        self.keep_composites = keep;
        self
    }

    /// Classify a filing's HTML into an ordered element list.
    pub fn parse(&self, html: &str) -> Result<Vec<SemanticElement>> {
        let document = dom::parse_document(html);
        let root = dom::body(&document).unwrap_or(document);

        let mut elements: Vec<SemanticElement> = root
            .children()
            .into_iter()
            .filter(|node| node.is_element())
            .map(|node| SemanticElement::unclassified(HtmlTag::new(node)))
            .collect();
        if elements.is_empty() {
            return Err(Error::EmptyDocument);
        }

        for mut step in (self.factory)() {
            elements = step.process(elements)?;
        }

        if !self.keep_composites {
            elements = flatten(elements);
        }
        Ok(elements)
    }

    /// Classify and assemble the outline tree in one call.
    pub fn parse_to_tree(&self, html: &str) -> Result<SemanticTree> {
        let elements = self.parse(html)?;
        Ok(TreeBuilder::new().build(elements))
    }
}

/// Recursively replace Composite containers with their children, keeping
/// document order.
fn flatten(elements: Vec<SemanticElement>) -> Vec<SemanticElement> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        let (kind, tag, log) = element.into_parts();
        match kind {
            ElementKind::Composite(children) => out.extend(flatten(children)),
            other => out.push(SemanticElement::from_parts(other, tag, log)),
        }
    }
    out
}
