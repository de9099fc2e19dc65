//! Rc-based DOM for filing HTML.
//!
//! html5ever parses into this tree through the [`Sink`] in `tree_sink`. After
//! parsing, the tree is read-only as far as the pipeline is concerned: the
//! only post-parse mutation is [`Node::synthetic_container`], which wraps
//! existing nodes under a new element when adjacent text elements are merged.

mod tree_sink;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, QualName, ns};

pub use tree_sink::Sink;

/// Shared reference to a DOM node.
pub type Handle = Rc<Node>;

/// Node type in the DOM.
#[derive(Debug)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        /// RefCell because html5ever may add missing attributes mid-parse.
        attrs: RefCell<Vec<Attribute>>,
    },
    /// Text content. RefCell so adjacent text chunks merge during parsing.
    Text(RefCell<String>),
    /// Comment (ignored but needed for TreeSink).
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the DOM tree.
#[derive(Debug)]
pub struct Node {
    data: NodeData,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<Handle>>,
}

impl Node {
    /// Create a new detached node.
    pub fn new(data: NodeData) -> Handle {
        Rc::new(Node {
            data,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Create a detached element node with the given tag name.
    pub fn new_element(tag: &str, attrs: Vec<Attribute>) -> Handle {
        Node::new(NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs: RefCell::new(attrs),
        })
    }

    /// Create a container element adopting existing nodes as its children.
    ///
    /// The adopted nodes stay linked into their original tree; the container
    /// only references them. Used when merging adjacent text elements into a
    /// single element spanning several source tags.
    pub fn synthetic_container(children: Vec<Handle>) -> Handle {
        let container = Node::new_element("div", Vec::new());
        *container.children.borrow_mut() = children;
        container
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Ordered child handles (cloned; handles are cheap Rc copies).
    pub fn children(&self) -> Vec<Handle> {
        self.children.borrow().clone()
    }

    pub fn parent(&self) -> Option<Handle> {
        self.parent.borrow().upgrade()
    }

    /// Element tag name, if this is an element.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    /// Attribute value by local name.
    pub fn attr(&self, attr_name: &str) -> Option<String> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.clone()),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// True for text nodes containing only whitespace.
    pub fn is_blank_text(&self) -> bool {
        match &self.data {
            NodeData::Text(text) => text.borrow().trim().is_empty(),
            _ => false,
        }
    }

    /// Text node contents, if this is a text node.
    pub fn text_content(&self) -> Option<String> {
        match &self.data {
            NodeData::Text(text) => Some(text.borrow().clone()),
            _ => None,
        }
    }

    /// Append a child, reparenting it onto this node.
    pub(crate) fn append(self: &Handle, child: Handle) {
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
    }

    /// Append text, merging into a trailing text child if present.
    pub(crate) fn append_text(self: &Handle, text: &str) {
        if let Some(last) = self.children.borrow().last()
            && let NodeData::Text(existing) = &last.data
        {
            existing.borrow_mut().push_str(text);
            return;
        }
        let node = Node::new(NodeData::Text(RefCell::new(text.to_string())));
        self.append(node);
    }

    /// Insert a node immediately before a sibling under this node.
    pub(crate) fn insert_before(self: &Handle, sibling: &Handle, new_node: Handle) {
        *new_node.parent.borrow_mut() = Rc::downgrade(self);
        let mut children = self.children.borrow_mut();
        let index = children
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(children.len());
        children.insert(index, new_node);
    }

    /// Detach this node from its parent, if any.
    pub(crate) fn remove_from_parent(self: &Handle) {
        if let Some(parent) = self.parent() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, self));
        }
        *self.parent.borrow_mut() = Weak::new();
    }

    /// Move all children of this node onto another parent.
    pub(crate) fn reparent_children(self: &Handle, new_parent: &Handle) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            new_parent.append(child);
        }
    }

    /// Find the first node matching a predicate (depth-first).
    pub fn find<F>(self: &Handle, predicate: F) -> Option<Handle>
    where
        F: Fn(&Handle) -> bool,
    {
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            if predicate(&node) {
                return Some(node);
            }
            let mut children = node.children();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// Find the first element with the given tag name (depth-first).
    pub fn find_by_tag(self: &Handle, tag: &str) -> Option<Handle> {
        self.find(|node| node.tag_name() == Some(tag))
    }
}

/// Parse a full HTML document into a DOM tree.
///
/// Lenient like a browser: parse errors are ignored, and html5ever supplies
/// the implied `<html>`/`<head>`/`<body>` scaffolding.
pub fn parse_document(html: &str) -> Handle {
    let sink = html5ever::parse_document(Sink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    sink.into_document()
}

/// The `<body>` element of a parsed document.
pub fn body(document: &Handle) -> Option<Handle> {
    document.find_by_tag("body")
}

// ============================================================================
// Serialization
// ============================================================================

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Render a node's subtree back to HTML.
///
/// `pretty` indents one element per line; otherwise output is compact.
pub fn serialize(node: &Handle, pretty: bool) -> String {
    let mut out = String::new();
    write_node(node, pretty, 0, &mut out);
    if pretty {
        out.truncate(out.trim_end().len());
    }
    out
}

fn write_node(node: &Handle, pretty: bool, depth: usize, out: &mut String) {
    match node.data() {
        NodeData::Document => {
            for child in node.children() {
                write_node(&child, pretty, depth, out);
            }
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            if pretty {
                push_indent(depth, out);
            }
            out.push('<');
            out.push_str(tag);
            for attr in attrs.borrow().iter() {
                out.push(' ');
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                if pretty {
                    out.push('\n');
                }
                return;
            }
            let children = node.children();
            let inline = !pretty || children.iter().all(|c| c.is_text());
            if inline {
                for child in &children {
                    if let Some(text) = child.text_content() {
                        let text = if pretty { text.trim().to_string() } else { text };
                        escape_into(&text, false, out);
                    } else {
                        write_node(child, false, 0, out);
                    }
                }
            } else {
                out.push('\n');
                for child in &children {
                    match child.data() {
                        NodeData::Text(text) => {
                            let trimmed = text.borrow().trim().to_string();
                            if !trimmed.is_empty() {
                                push_indent(depth + 1, out);
                                escape_into(&trimmed, false, out);
                                out.push('\n');
                            }
                        }
                        _ => write_node(child, pretty, depth + 1, out),
                    }
                }
                push_indent(depth, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
            if pretty {
                out.push('\n');
            }
        }
        NodeData::Text(text) => {
            escape_into(&text.borrow(), false, out);
        }
        NodeData::Comment(_) => {}
        NodeData::Doctype { name } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
            if pretty {
                out.push('\n');
            }
        }
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape_into(text: &str, in_attr: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
