//! Adapter over one DOM node.
//!
//! Every semantic element wraps exactly one [`HtmlTag`]. The adapter is
//! created once per node, shared by cheap clones, and caches everything it
//! derives (text, children, unary-tree flag, style metrics). The DOM is
//! read-only after parsing, so the caches never need invalidation.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::{self, Handle, NodeData};
use crate::style::{StyleMetrics, parse_style_attribute};

/// Cached view over a DOM node.
#[derive(Clone)]
pub struct HtmlTag {
    node: Handle,
    caches: Rc<Caches>,
}

#[derive(Default)]
struct Caches {
    text: OnceCell<String>,
    children: OnceCell<Vec<HtmlTag>>,
    loose_text: OnceCell<bool>,
    unary: OnceCell<bool>,
    metrics: OnceCell<StyleMetrics>,
}

impl HtmlTag {
    pub fn new(node: Handle) -> Self {
        HtmlTag {
            node,
            caches: Rc::new(Caches::default()),
        }
    }

    /// Tag name; empty for non-element nodes.
    pub fn name(&self) -> &str {
        self.node.tag_name().unwrap_or("")
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.node.attr(name)
    }

    /// Recursive text content, whitespace-collapsed and trimmed. Cached.
    pub fn text(&self) -> &str {
        self.caches.text.get_or_init(|| {
            let mut raw = String::new();
            collect_text(&self.node, &mut raw);
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        })
    }

    /// Ordered element children; text and comment nodes are skipped. Cached.
    pub fn children(&self) -> &[HtmlTag] {
        self.caches.children.get_or_init(|| {
            self.node
                .children()
                .into_iter()
                .filter(|child| child.is_element())
                .map(HtmlTag::new)
                .collect()
        })
    }

    /// True when a non-blank text node sits directly among this node's
    /// children.
    pub fn has_loose_text(&self) -> bool {
        *self.caches.loose_text.get_or_init(|| {
            self.node
                .children()
                .iter()
                .any(|child| child.is_text() && !child.is_blank_text())
        })
    }

    /// True if any descendant (or self, when requested) has the given tag
    /// name.
    pub fn contains_tag(&self, name: &str, include_self: bool) -> bool {
        if include_self && self.name() == name {
            return true;
        }
        self.node
            .find(|node| !Rc::ptr_eq(node, &self.node) && node.tag_name() == Some(name))
            .is_some()
    }

    /// First descendant (self included) with the given tag name.
    pub fn find_tag(&self, name: &str) -> Option<HtmlTag> {
        self.node
            .find(|node| node.tag_name() == Some(name))
            .map(HtmlTag::new)
    }

    /// Number of descendants (self included) with the given tag name.
    pub fn count_tags(&self, name: &str) -> usize {
        let mut count = 0;
        let mut stack = vec![self.node.clone()];
        while let Some(node) = stack.pop() {
            if node.tag_name() == Some(name) {
                count += 1;
            }
            stack.extend(node.children());
        }
        count
    }

    /// Whether this subtree is an atomic block.
    ///
    /// Tables are always unary regardless of internal structure; filings nest
    /// arbitrary markup inside tables that is irrelevant to segmentation.
    /// Otherwise a node is unary when it has no element children, or exactly
    /// one element child (with no non-blank text beside it) that is itself
    /// unary. Memoized.
    pub fn is_unary_tree(&self) -> bool {
        *self.caches.unary.get_or_init(|| {
            if self.name() == "table" {
                return true;
            }
            let children = self.children();
            match children.len() {
                0 => true,
                1 => !self.has_loose_text() && children[0].is_unary_tree(),
                _ => false,
            }
        })
    }

    /// Descend through single-child chains to the first node with zero or
    /// several element children. Used for bullet and footnote marker
    /// detection.
    pub fn first_deepest_tag(&self) -> HtmlTag {
        let mut current = self.clone();
        loop {
            let next = {
                let children = current.children();
                if children.len() == 1 {
                    Some(children[0].clone())
                } else {
                    None
                }
            };
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Character-weighted style coverage for this subtree. Cached.
    ///
    /// Each text leaf's effective style is resolved with cascade semantics:
    /// the nearest ancestor's value wins per property, and within one
    /// declaration block the first occurrence of a property wins.
    pub fn text_styles_metrics(&self) -> &StyleMetrics {
        self.caches.metrics.get_or_init(|| {
            let mut counts = HashMap::new();
            let mut total = 0usize;
            accumulate_styles(&self.node, &HashMap::new(), &mut counts, &mut total);
            StyleMetrics::from_counts(counts, total)
        })
    }

    /// The subtree rendered back to HTML.
    pub fn source_code(&self, pretty: bool) -> String {
        dom::serialize(&self.node, pretty)
    }

    pub(crate) fn node(&self) -> &Handle {
        &self.node
    }

    /// Stable identity of the underlying node, for keying per-document
    /// bookkeeping.
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.node) as usize
    }
}

impl fmt::Debug for HtmlTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlTag")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

fn collect_text(node: &Handle, out: &mut String) {
    match node.data() {
        NodeData::Text(text) => out.push_str(&text.borrow()),
        _ => {
            for child in node.children() {
                collect_text(&child, out);
            }
        }
    }
}

fn accumulate_styles(
    node: &Handle,
    inherited: &HashMap<String, String>,
    counts: &mut HashMap<(String, String), usize>,
    total: &mut usize,
) {
    let effective = effective_style(node, inherited);
    for child in node.children() {
        match child.data() {
            NodeData::Text(text) => {
                let chars = text
                    .borrow()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .count();
                if chars > 0 {
                    *total += chars;
                    for (property, value) in &effective {
                        *counts
                            .entry((property.clone(), value.clone()))
                            .or_insert(0) += chars;
                    }
                }
            }
            NodeData::Element { .. } => accumulate_styles(&child, &effective, counts, total),
            _ => {}
        }
    }
}

fn effective_style(node: &Handle, inherited: &HashMap<String, String>) -> HashMap<String, String> {
    let declarations = match node.attr("style") {
        Some(style) => parse_style_attribute(&style),
        None => return inherited.clone(),
    };
    let mut own: HashMap<String, String> = HashMap::new();
    for (property, value) in declarations {
        // First occurrence of a property within one block wins.
        own.entry(property).or_insert(value);
    }
    let mut effective = inherited.clone();
    effective.extend(own);
    effective
}
