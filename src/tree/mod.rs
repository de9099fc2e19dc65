//! Tree assembly.
//!
//! Transforms the pipeline's flat, ordered element list into a forest that
//! mirrors the document's logical outline (Part → Item → Title → Text).
//! A stack of open nodes tracks the current nesting context; pluggable
//! [`NestingRule`]s decide which open node, if any, becomes each new
//! element's parent. No rule match means a new root; multiple roots are a
//! normal outcome (e.g. cover-page content before the first section).

mod rules;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::{Value, json};

use crate::element::SemanticElement;

pub use rules::{LevelRule, NestingRule, TitleRule, TopLevelSectionRule, default_rules};

/// A node in the assembled outline.
pub struct TreeNode {
    element: SemanticElement,
    parent: RefCell<Weak<TreeNode>>,
    children: RefCell<Vec<Rc<TreeNode>>>,
}

impl TreeNode {
    pub fn new(element: SemanticElement) -> Rc<TreeNode> {
        Rc::new(TreeNode {
            element,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn element(&self) -> &SemanticElement {
        &self.element
    }

    pub fn text(&self) -> &str {
        self.element.text()
    }

    pub fn source_code(&self, pretty: bool) -> String {
        self.element.source_code(pretty)
    }

    pub fn parent(&self) -> Option<Rc<TreeNode>> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<Rc<TreeNode>> {
        self.children.borrow().clone()
    }

    /// Attach this node under a parent, keeping both sides of the link
    /// consistent: the node is removed from any previous parent's child
    /// list and appended to the new parent's. This is the only way parent
    /// links change.
    pub fn set_parent(self: &Rc<Self>, new_parent: &Rc<TreeNode>) {
        if let Some(old_parent) = self.parent() {
            old_parent
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(child, self));
        }
        *self.parent.borrow_mut() = Rc::downgrade(new_parent);
        new_parent.children.borrow_mut().push(self.clone());
    }
}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("category", &self.element.category())
            .field("text", &self.element.text())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// The assembled forest, in document order.
pub struct SemanticTree {
    roots: Vec<Rc<TreeNode>>,
}

impl SemanticTree {
    pub fn roots(&self) -> &[Rc<TreeNode>] {
        &self.roots
    }

    /// Every node, depth-first in document order.
    pub fn nodes(&self) -> Vec<Rc<TreeNode>> {
        let mut out = Vec::new();
        fn walk(node: &Rc<TreeNode>, out: &mut Vec<Rc<TreeNode>>) {
            out.push(node.clone());
            for child in node.children() {
                walk(&child, out);
            }
        }
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }

    /// JSON rendering of the forest: element summaries with nested children.
    pub fn to_json(&self) -> Value {
        fn node_json(node: &Rc<TreeNode>) -> Value {
            let children: Vec<Value> = node.children().iter().map(node_json).collect();
            json!({
                "element": node.element().to_json(false),
                "children": children,
            })
        }
        Value::Array(self.roots.iter().map(node_json).collect())
    }
}

/// Assembles elements into a [`SemanticTree`] using a rule set.
pub struct TreeBuilder {
    rules: Vec<Box<dyn NestingRule>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            rules: default_rules(),
        }
    }

    /// Custom rule set, evaluated as an OR-combination.
    pub fn with_rules(rules: Vec<Box<dyn NestingRule>>) -> Self {
        TreeBuilder { rules }
    }

    pub fn build(&self, elements: Vec<SemanticElement>) -> SemanticTree {
        let mut roots: Vec<Rc<TreeNode>> = Vec::new();
        let mut stack: Vec<Rc<TreeNode>> = Vec::new();

        for element in elements {
            let node = TreeNode::new(element);
            loop {
                match stack.last() {
                    Some(top) => {
                        let accepts = self
                            .rules
                            .iter()
                            .any(|rule| rule.should_nest_under(top.element(), node.element()));
                        if accepts {
                            node.set_parent(top);
                            break;
                        }
                        stack.pop();
                    }
                    None => {
                        roots.push(node.clone());
                        break;
                    }
                }
            }
            // Every node stays open to accept its own future children.
            stack.push(node);
        }

        SemanticTree { roots }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::element::{ElementCategory, ElementKind};
    use crate::html_tag::HtmlTag;
    use crate::section::{FormType, lookup};

    fn element(kind: ElementKind, text: &str) -> SemanticElement {
        let dom = parse_document(&format!("<p>{text}</p>"));
        let tag = HtmlTag::new(dom.find_by_tag("p").expect("p"));
        SemanticElement::unclassified(tag).reclassify(kind, "test", "fixture")
    }

    fn title(level: u32, text: &str) -> SemanticElement {
        element(ElementKind::Title { level }, text)
    }

    fn section(identifier: &str) -> SemanticElement {
        let identity = lookup(FormType::TenQ, identifier).expect("known section");
        element(
            ElementKind::TopLevelSectionTitle {
                level: identity.level(),
                identity,
            },
            identifier,
        )
    }

    fn text(content: &str) -> SemanticElement {
        element(ElementKind::Text, content)
    }

    #[test]
    fn title_levels_nest_by_prominence() {
        let tree = TreeBuilder::new().build(vec![
            title(1, "A"),
            title(2, "B"),
            title(2, "C"),
        ]);

        assert_eq!(tree.roots().len(), 1);
        let root = &tree.roots()[0];
        assert_eq!(root.text(), "A");
        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].text(), "B");
        assert_eq!(children[1].text(), "C");
    }

    #[test]
    fn sections_claim_following_content() {
        let tree = TreeBuilder::new().build(vec![
            section("part1"),
            section("part1item1"),
            text("item one prose"),
            section("part1item2"),
            text("item two prose"),
        ]);

        assert_eq!(tree.roots().len(), 1);
        let part = &tree.roots()[0];
        let items = part.children();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text(), "part1item1");
        assert_eq!(items[0].children().len(), 1);
        assert_eq!(items[1].children()[0].text(), "item two prose");
    }

    #[test]
    fn new_part_closes_previous_part() {
        let tree = TreeBuilder::new().build(vec![
            section("part1"),
            section("part1item1"),
            section("part2"),
            section("part2item1"),
        ]);

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.roots()[0].text(), "part1");
        assert_eq!(tree.roots()[1].text(), "part2");
        assert_eq!(tree.roots()[1].children()[0].text(), "part2item1");
    }

    #[test]
    fn preamble_content_forms_extra_roots() {
        let tree = TreeBuilder::new().build(vec![
            text("cover page"),
            text("address"),
            section("part1"),
            text("prose"),
        ]);

        assert_eq!(tree.roots().len(), 3);
        assert!(tree.roots()[2].parent().is_none());
        assert_eq!(tree.roots()[2].children().len(), 1);
    }

    #[test]
    fn title_claims_text_but_not_sections() {
        let tree = TreeBuilder::new().build(vec![
            section("part1item1"),
            title(0, "Liquidity"),
            text("details"),
            section("part1item2"),
        ]);

        assert_eq!(tree.roots().len(), 2);
        let item1 = &tree.roots()[0];
        let liquidity = &item1.children()[0];
        assert_eq!(liquidity.text(), "Liquidity");
        assert_eq!(liquidity.children()[0].text(), "details");
        // part1item2 did not nest under the title.
        assert_eq!(tree.roots()[1].text(), "part1item2");
    }

    #[test]
    fn set_parent_detaches_from_old_parent() {
        let a = TreeNode::new(title(0, "A"));
        let b = TreeNode::new(title(0, "B"));
        let child = TreeNode::new(text("child"));

        child.set_parent(&a);
        assert_eq!(a.children().len(), 1);

        child.set_parent(&b);
        assert!(a.children().is_empty());
        assert_eq!(b.children().len(), 1);
        assert!(Rc::ptr_eq(&child.parent().unwrap(), &b));
    }

    #[test]
    fn dfs_order_matches_document_order() {
        let tree = TreeBuilder::new().build(vec![
            section("part1"),
            text("alpha"),
            section("part1item1"),
            text("beta"),
        ]);
        let texts: Vec<String> = tree
            .nodes()
            .iter()
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(texts, vec!["part1", "alpha", "part1item1", "beta"]);
    }

    #[test]
    fn json_rendering_nests_children() {
        let tree = TreeBuilder::new().build(vec![section("part1"), text("prose")]);
        let value = tree.to_json();
        assert_eq!(value[0]["element"]["cls"], "TopLevelSectionTitle");
        assert_eq!(value[0]["children"][0]["element"]["cls"], "Text");
        assert_eq!(tree.nodes().len(), 2);
    }

    #[test]
    fn elements_without_rules_match_stay_flat() {
        let tree = TreeBuilder::new().build(vec![text("a"), text("b"), text("c")]);
        assert_eq!(tree.roots().len(), 3);
        assert_eq!(tree.roots()[1].element().category(), ElementCategory::Text);
    }
}
