//! Nesting rules.
//!
//! Each rule is a predicate deciding whether a candidate element should
//! become the tree-parent of a new element. The builder ORs the configured
//! rules together: the first stack entry any rule accepts becomes the
//! parent.

use crate::element::{ElementCategory, SemanticElement};

pub trait NestingRule {
    fn should_nest_under(&self, parent: &SemanticElement, child: &SemanticElement) -> bool;
}

/// The rules the tree builder uses by default.
pub fn default_rules() -> Vec<Box<dyn NestingRule>> {
    vec![
        Box::new(TopLevelSectionRule),
        Box::new(TitleRule),
        Box::new(LevelRule),
    ]
}

/// Everything nests under the most recent top-level section title, until
/// another section of equal or higher rank appears.
pub struct TopLevelSectionRule;

impl NestingRule for TopLevelSectionRule {
    fn should_nest_under(&self, parent: &SemanticElement, child: &SemanticElement) -> bool {
        if parent.category() != ElementCategory::TopLevelSectionTitle {
            return false;
        }
        if child.category() == ElementCategory::TopLevelSectionTitle {
            return match (parent.level(), child.level()) {
                (Some(parent_level), Some(child_level)) => parent_level < child_level,
                _ => false,
            };
        }
        true
    }
}

/// Ordinary content nests under the most recent title. Section titles and
/// other titles are excluded: sections outrank titles, and title-to-title
/// nesting is decided by levels alone.
pub struct TitleRule;

impl NestingRule for TitleRule {
    fn should_nest_under(&self, parent: &SemanticElement, child: &SemanticElement) -> bool {
        parent.category() == ElementCategory::Title
            && child.category() != ElementCategory::TopLevelSectionTitle
            && child.category() != ElementCategory::Title
    }
}

/// Between two elements of the same kind that carry levels, the more
/// prominent (numerically lower) level is the ancestor.
pub struct LevelRule;

impl NestingRule for LevelRule {
    fn should_nest_under(&self, parent: &SemanticElement, child: &SemanticElement) -> bool {
        if parent.category() != child.category() {
            return false;
        }
        match (parent.level(), child.level()) {
            (Some(parent_level), Some(child_level)) => parent_level < child_level,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::element::ElementKind;
    use crate::html_tag::HtmlTag;
    use crate::section::{FormType, lookup};

    fn element(kind: ElementKind, text: &str) -> SemanticElement {
        let dom = parse_document(&format!("<p>{text}</p>"));
        let tag = HtmlTag::new(dom.find_by_tag("p").expect("p"));
        SemanticElement::unclassified(tag).reclassify(kind, "test", "fixture")
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

    #[test]
    fn section_claims_content_and_items() {
        let part = section("part1");
        let item = section("part1item1");
        let text = element(ElementKind::Text, "prose");

        let rule = TopLevelSectionRule;
        assert!(rule.should_nest_under(&part, &text));
        assert!(rule.should_nest_under(&part, &item));
        // Equal rank starts a new section instead of nesting.
        assert!(!rule.should_nest_under(&item, &section("part1item2")));
        assert!(!rule.should_nest_under(&item, &section("part2")));
    }

    #[test]
    fn title_rule_excludes_sections_and_titles() {
        let title = element(ElementKind::Title { level: 0 }, "Overview");
        let text = element(ElementKind::Text, "prose");

        let rule = TitleRule;
        assert!(rule.should_nest_under(&title, &text));
        assert!(!rule.should_nest_under(&title, &section("part1")));
        assert!(!rule.should_nest_under(&title, &element(ElementKind::Title { level: 1 }, "Sub")));
    }

    #[test]
    fn level_rule_requires_same_kind_and_lower_level() {
        let rule = LevelRule;
        let top = element(ElementKind::Title { level: 0 }, "A");
        let sub = element(ElementKind::Title { level: 1 }, "B");

        assert!(rule.should_nest_under(&top, &sub));
        assert!(!rule.should_nest_under(&sub, &top));
        assert!(!rule.should_nest_under(&top, &element(ElementKind::Title { level: 0 }, "C")));
        assert!(!rule.should_nest_under(&top, &element(ElementKind::Text, "prose")));
    }
}
