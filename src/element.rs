//! Semantic element model.
//!
//! A [`SemanticElement`] is a classified unit of document content: one shared
//! [`HtmlTag`] plus a closed [`ElementKind`] and an append-only processing
//! log. Pipeline steps never mutate an element's type in place; they replace
//! the element with a new one carrying the same tag and a copied log, so
//! lineage survives every transformation.

use serde::Serialize;
use serde_json::{Value, json};

use crate::html_tag::HtmlTag;
use crate::section::SectionIdentity;
use crate::style::TextStyle;
use crate::{Error, Result};

/// One entry in an element's processing log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Name of the step that wrote the entry.
    pub origin: String,
    pub message: String,
}

/// Append-only record of what the pipeline did to an element.
#[derive(Debug, Clone, Default)]
pub struct ProcessingLog {
    entries: Vec<LogEntry>,
}

impl ProcessingLog {
    pub fn record(&mut self, origin: &str, message: impl Into<String>) {
        self.entries.push(LogEntry {
            origin: origin.to_string(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classified type of a semantic element.
#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Not yet classified; every element starts here.
    Unclassified,
    /// Content that carries no information for segmentation.
    Irrelevant,
    /// No extractable words at all.
    Empty,
    /// Plain prose.
    Text,
    /// Visually emphasized text, before title ranking.
    Highlighted(TextStyle),
    /// A heading, ranked by the first-seen order of its style.
    Title { level: u32 },
    /// A canonical Part/Item section start.
    TopLevelSectionTitle {
        level: u32,
        identity: SectionIdentity,
    },
    Table,
    Image,
    /// Numbered footnote.
    Footnote,
    /// Bulleted list entry; level follows the first-seen order of the
    /// bullet symbol, starting at 1.
    Bulletpoint { level: u32 },
    /// One HTML node containing several semantic children.
    Composite(Vec<SemanticElement>),
    /// A step failed on this element; the original is preserved.
    Error {
        step: String,
        message: String,
        original: Box<SemanticElement>,
    },
}

impl ElementKind {
    /// Checked bulletpoint constructor; levels start at 1.
    pub fn bulletpoint(level: u32) -> Result<ElementKind> {
        if level < 1 {
            return Err(Error::BulletpointLevel(level));
        }
        Ok(ElementKind::Bulletpoint { level })
    }
}

/// Fieldless discriminant of [`ElementKind`], used by step filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    Unclassified,
    Irrelevant,
    Empty,
    Text,
    Highlighted,
    Title,
    TopLevelSectionTitle,
    Table,
    Image,
    Footnote,
    Bulletpoint,
    Composite,
    Error,
}

impl ElementCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ElementCategory::Unclassified => "Unclassified",
            ElementCategory::Irrelevant => "Irrelevant",
            ElementCategory::Empty => "Empty",
            ElementCategory::Text => "Text",
            ElementCategory::Highlighted => "Highlighted",
            ElementCategory::Title => "Title",
            ElementCategory::TopLevelSectionTitle => "TopLevelSectionTitle",
            ElementCategory::Table => "Table",
            ElementCategory::Image => "Image",
            ElementCategory::Footnote => "Footnote",
            ElementCategory::Bulletpoint => "Bulletpoint",
            ElementCategory::Composite => "Composite",
            ElementCategory::Error => "Error",
        }
    }
}

impl std::fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified unit of document content.
#[derive(Debug, Clone)]
pub struct SemanticElement {
    kind: ElementKind,
    tag: HtmlTag,
    log: ProcessingLog,
}

impl SemanticElement {
    /// Wrap a tag as an unclassified element with an empty log.
    pub fn unclassified(tag: HtmlTag) -> Self {
        SemanticElement {
            kind: ElementKind::Unclassified,
            tag,
            log: ProcessingLog::default(),
        }
    }

    /// Checked composite constructor: a composite stands for "this node
    /// contains several semantic children", so zero children is a logic bug.
    pub fn composite(
        tag: HtmlTag,
        children: Vec<SemanticElement>,
        log: ProcessingLog,
    ) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::EmptyComposite);
        }
        Ok(SemanticElement {
            kind: ElementKind::Composite(children),
            tag,
            log,
        })
    }

    /// Replace this element with one of a different kind, keeping the tag
    /// and extending a copy of the log.
    pub fn reclassify(self, kind: ElementKind, origin: &str, message: impl Into<String>) -> Self {
        let mut log = self.log;
        log.record(origin, message);
        SemanticElement {
            kind,
            tag: self.tag,
            log,
        }
    }

    /// Wrap this element as an Error element after a step failure.
    pub(crate) fn into_error(self, step: &str, error: &Error) -> Self {
        let tag = self.tag.clone();
        let mut log = self.log.clone();
        let message = error.to_string();
        log.record(step, format!("failed: {message}"));
        SemanticElement {
            kind: ElementKind::Error {
                step: step.to_string(),
                message,
                original: Box::new(self),
            },
            tag,
            log,
        }
    }

    /// Append a log entry without changing the element's type.
    pub fn record(&mut self, origin: &str, message: impl Into<String>) {
        self.log.record(origin, message);
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn category(&self) -> ElementCategory {
        match &self.kind {
            ElementKind::Unclassified => ElementCategory::Unclassified,
            ElementKind::Irrelevant => ElementCategory::Irrelevant,
            ElementKind::Empty => ElementCategory::Empty,
            ElementKind::Text => ElementCategory::Text,
            ElementKind::Highlighted(_) => ElementCategory::Highlighted,
            ElementKind::Title { .. } => ElementCategory::Title,
            ElementKind::TopLevelSectionTitle { .. } => ElementCategory::TopLevelSectionTitle,
            ElementKind::Table => ElementCategory::Table,
            ElementKind::Image => ElementCategory::Image,
            ElementKind::Footnote => ElementCategory::Footnote,
            ElementKind::Bulletpoint { .. } => ElementCategory::Bulletpoint,
            ElementKind::Composite(_) => ElementCategory::Composite,
            ElementKind::Error { .. } => ElementCategory::Error,
        }
    }

    pub fn tag(&self) -> &HtmlTag {
        &self.tag
    }

    /// Text of the underlying tag. For composites and merged elements this
    /// spans all contained content, since the tag is their common root.
    pub fn text(&self) -> &str {
        self.tag.text()
    }

    pub fn source_code(&self, pretty: bool) -> String {
        self.tag.source_code(pretty)
    }

    pub fn processing_log(&self) -> &ProcessingLog {
        &self.log
    }

    /// Outline level, for the kinds that carry one.
    pub fn level(&self) -> Option<u32> {
        match &self.kind {
            ElementKind::Title { level }
            | ElementKind::TopLevelSectionTitle { level, .. }
            | ElementKind::Bulletpoint { level } => Some(*level),
            _ => None,
        }
    }

    /// JSON summary: class name, text, type-specific fields, and the
    /// processing log. `include_html` adds the compact source HTML.
    pub fn to_json(&self, include_html: bool) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("cls".to_string(), json!(self.category().name()));
        obj.insert("text".to_string(), json!(self.text()));

        match &self.kind {
            ElementKind::Highlighted(style) => {
                obj.insert("style".to_string(), json!(style));
            }
            ElementKind::Title { level } | ElementKind::Bulletpoint { level } => {
                obj.insert("level".to_string(), json!(level));
            }
            ElementKind::TopLevelSectionTitle { level, identity } => {
                obj.insert("level".to_string(), json!(level));
                obj.insert("identifier".to_string(), json!(identity.identifier()));
                obj.insert("section_title".to_string(), json!(identity.title()));
            }
            ElementKind::Composite(children) => {
                let inner: Vec<Value> =
                    children.iter().map(|c| c.to_json(include_html)).collect();
                obj.insert("inner_elements".to_string(), Value::Array(inner));
            }
            ElementKind::Error { step, message, original } => {
                obj.insert("step".to_string(), json!(step));
                obj.insert("message".to_string(), json!(message));
                obj.insert("original_cls".to_string(), json!(original.category().name()));
            }
            _ => {}
        }

        if include_html {
            obj.insert("html_tag".to_string(), json!(self.source_code(false)));
        }
        if !self.log.is_empty() {
            obj.insert(
                "processing_log".to_string(),
                json!(self.log.entries()),
            );
        }
        Value::Object(obj)
    }

    pub(crate) fn into_parts(self) -> (ElementKind, HtmlTag, ProcessingLog) {
        (self.kind, self.tag, self.log)
    }

    pub(crate) fn from_parts(kind: ElementKind, tag: HtmlTag, log: ProcessingLog) -> Self {
        SemanticElement { kind, tag, log }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    fn tag(html: &str, name: &str) -> HtmlTag {
        let dom = parse_document(html);
        HtmlTag::new(dom.find_by_tag(name).expect("tag present"))
    }

    #[test]
    fn composite_requires_children() {
        let t = tag("<div><p>a</p></div>", "div");
        let err = SemanticElement::composite(t, Vec::new(), ProcessingLog::default());
        assert!(matches!(err, Err(Error::EmptyComposite)));
    }

    #[test]
    fn bulletpoint_level_starts_at_one() {
        assert!(matches!(
            ElementKind::bulletpoint(0),
            Err(Error::BulletpointLevel(0))
        ));
        assert!(ElementKind::bulletpoint(1).is_ok());
    }

    #[test]
    fn reclassify_extends_log_copy() {
        let element = SemanticElement::unclassified(tag("<p>hello</p>", "p"));
        let replaced = element.reclassify(ElementKind::Text, "text", "classified as prose");

        assert_eq!(replaced.category(), ElementCategory::Text);
        let entries = replaced.processing_log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].origin, "text");
    }

    #[test]
    fn error_wraps_original() {
        let element = SemanticElement::unclassified(tag("<p>hello</p>", "p"));
        let failed = element.into_error("prune", &Error::step("prune", "boom"));

        assert_eq!(failed.category(), ElementCategory::Error);
        match failed.kind() {
            ElementKind::Error { original, .. } => {
                assert_eq!(original.category(), ElementCategory::Unclassified);
            }
            _ => panic!("expected error kind"),
        }
    }

    #[test]
    fn json_summary_includes_type_fields() {
        let element = SemanticElement::unclassified(tag("<p>hello</p>", "p"))
            .reclassify(ElementKind::Title { level: 2 }, "title", "ranked");
        let value = element.to_json(true);

        assert_eq!(value["cls"], "Title");
        assert_eq!(value["level"], 2);
        assert_eq!(value["text"], "hello");
        assert_eq!(value["html_tag"], "<p>hello</p>");
        assert_eq!(value["processing_log"][0]["origin"], "title");
    }
}
