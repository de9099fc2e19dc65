//! Top-level section detection.
//!
//! Two passes. Pass one scans every element for a leading "Part <roman>" or
//! "Item <number>[letter]" pattern and records candidates resolved against
//! the form's canonical outline; table elements are scanned line-free for
//! every embedded reference, since tables of contents repeat section names
//! without being the actual section start. Between passes, each identifier's
//! first candidate outside a table wins (falling back to the first overall).
//! Pass two walks the document in order and accepts winners only while their
//! canonical order strictly increases, discarding spurious back-references.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::section::{self, FormType, SectionIdentity};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};

/// Matches "Part I" at the start of a block.
pub(crate) static PART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^part\s+([ivx]+)\b").unwrap());

/// Matches "Item 1A" at the start of a block.
pub(crate) static ITEM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^item\s+(\d{1,2})\s*([a-c])?\b").unwrap());

/// Matches Part/Item references anywhere, for scanning table text.
static ANYWHERE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:part\s+([ivx]+)|item\s+(\d{1,2})\s*([a-c])?)\b").unwrap()
});

struct Candidate {
    key: usize,
    identity: SectionIdentity,
    in_table: bool,
}

/// Detects canonical Part/Item section starts for one form type.
pub struct TopSectionStep {
    guard: RunGuard,
    form: FormType,
    /// Part context for bare "Item N" references, advanced in document order.
    current_part: u32,
    candidates: Vec<Candidate>,
    winners: HashMap<usize, SectionIdentity>,
    last_order: Option<u32>,
}

impl TopSectionStep {
    pub fn new(form: FormType) -> Self {
        TopSectionStep {
            guard: RunGuard::default(),
            form,
            current_part: 1,
            candidates: Vec::new(),
            winners: HashMap::new(),
            last_order: None,
        }
    }

    fn resolve_part(&self, number: u32) -> Option<SectionIdentity> {
        section::lookup(self.form, &format!("part{number}"))
    }

    fn resolve_item(&self, part: u32, number: u32, letter: Option<char>) -> Option<SectionIdentity> {
        let token = match letter {
            Some(letter) => format!("item{number}{letter}"),
            None => format!("item{number}"),
        };
        section::lookup(self.form, &format!("part{part}{token}"))
            .or_else(|| section::lookup_item(self.form, &token))
    }

    fn collect(&mut self, element: &mut SemanticElement) {
        let key = element.tag().key();
        let text = element.text().to_string();

        if element.category() == ElementCategory::Table {
            // Tables get a local part cursor so a table of contents resolves
            // its own "Item 1" rows without disturbing the document context.
            let mut part = self.current_part;
            for caps in ANYWHERE_PATTERN.captures_iter(&text) {
                if let Some(roman) = caps.get(1) {
                    if let Some(number) = section::parse_roman(roman.as_str()) {
                        part = number;
                        let identity = self.resolve_part(number);
                        self.push_candidate(element, key, identity, true, roman.as_str());
                    }
                } else if let Some(number) = caps.get(2) {
                    let Ok(number) = number.as_str().parse::<u32>() else {
                        continue;
                    };
                    let letter = capture_letter(&caps, 3);
                    let identity = self.resolve_item(part, number, letter);
                    self.push_candidate(element, key, identity, true, &format!("item {number}"));
                }
            }
        } else if let Some(caps) = PART_PATTERN.captures(&text) {
            let roman = &caps[1];
            match section::parse_roman(roman) {
                Some(number) => {
                    self.current_part = number;
                    let identity = self.resolve_part(number);
                    self.push_candidate(element, key, identity, false, roman);
                }
                None => self.push_candidate(element, key, None, false, roman),
            }
        } else if let Some(caps) = ITEM_PATTERN.captures(&text) {
            if let Ok(number) = caps[1].parse::<u32>() {
                let letter = capture_letter(&caps, 2);
                let identity = self.resolve_item(self.current_part, number, letter);
                self.push_candidate(element, key, identity, false, &format!("item {number}"));
            }
        }
    }

    fn push_candidate(
        &mut self,
        element: &mut SemanticElement,
        key: usize,
        identity: Option<SectionIdentity>,
        in_table: bool,
        token: &str,
    ) {
        let identity = match identity {
            Some(identity) => identity,
            None => {
                log::warn!("unrecognized section reference {token:?}, degrading to invalid section");
                element.record(
                    "sections",
                    format!("unrecognized section reference {token:?}"),
                );
                SectionIdentity::Invalid
            }
        };
        self.candidates.push(Candidate {
            key,
            identity,
            in_table,
        });
    }

    /// Per identifier, in first-seen order: prefer the first candidate that
    /// is not inside a table, else the first candidate overall.
    fn select_winners(&mut self) {
        let mut groups: Vec<(&'static str, Vec<usize>)> = Vec::new();
        for (index, candidate) in self.candidates.iter().enumerate() {
            let SectionIdentity::Known { spec, .. } = candidate.identity else {
                continue;
            };
            match groups.iter_mut().find(|(id, _)| *id == spec.identifier) {
                Some((_, members)) => members.push(index),
                None => groups.push((spec.identifier, vec![index])),
            }
        }
        for (_, members) in groups {
            let winner = members
                .iter()
                .map(|&i| &self.candidates[i])
                .find(|c| !c.in_table)
                .unwrap_or(&self.candidates[members[0]]);
            self.winners.insert(winner.key, winner.identity);
        }
    }
}

fn capture_letter(caps: &regex_lite::Captures<'_>, group: usize) -> Option<char> {
    caps.get(group)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
}

impl ElementwiseStep for TopSectionStep {
    fn name(&self) -> &'static str {
        "sections"
    }

    fn guard(&mut self) -> &mut RunGuard {
        &mut self.guard
    }

    fn filter(&self) -> StepFilter {
        StepFilter::only(vec![
            ElementCategory::Unclassified,
            ElementCategory::Highlighted,
            ElementCategory::Title,
            ElementCategory::Table,
        ])
    }

    fn passes(&self) -> usize {
        2
    }

    fn begin_pass(&mut self, _elements: &[SemanticElement], pass: usize) {
        if pass == 1 {
            self.select_winners();
        }
    }

    fn process_element(
        &mut self,
        mut element: SemanticElement,
        ctx: &StepContext,
    ) -> Result<SemanticElement> {
        if ctx.pass == 0 {
            self.collect(&mut element);
            return Ok(element);
        }

        let key = element.tag().key();
        let Some(identity) = self.winners.get(&key).copied() else {
            return Ok(element);
        };
        let Some(order) = identity.order() else {
            return Ok(element);
        };

        if self.last_order.is_some_and(|last| order <= last) {
            element.record(
                "sections",
                format!(
                    "rejected {}: canonical order does not advance",
                    identity.identifier()
                ),
            );
            return Ok(element);
        }

        self.last_order = Some(order);
        Ok(element.reclassify(
            ElementKind::TopLevelSectionTitle {
                level: identity.level(),
                identity,
            },
            "sections",
            format!("section start {}", identity.identifier()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::tests::elements_from;
    use crate::steps::{ProcessingStep, TableStep};

    fn run(form: FormType, html: &str) -> Vec<SemanticElement> {
        let elements = elements_from(html);
        let elements = TableStep::new().process(elements).unwrap();
        let mut step = TopSectionStep::new(form);
        step.process(elements).unwrap()
    }

    #[test]
    fn sections_accepted_in_order() {
        let elements = run(
            FormType::TenQ,
            "<p>Part I</p><p>Item 1. Financial Statements</p><p>Item 2. MD&amp;A</p>",
        );
        let identifiers: Vec<Option<&str>> = elements
            .iter()
            .map(|e| match e.kind() {
                ElementKind::TopLevelSectionTitle { identity, .. } => Some(identity.identifier()),
                _ => None,
            })
            .collect();
        assert_eq!(
            identifiers,
            vec![Some("part1"), Some("part1item1"), Some("part1item2")]
        );
    }

    #[test]
    fn duplicate_mention_is_rejected() {
        let elements = run(
            FormType::TenQ,
            "<p>Part I</p><p>Item 1</p><p>Item 2</p><p>Item 1</p>",
        );
        assert_eq!(elements[1].category(), ElementCategory::TopLevelSectionTitle);
        assert_eq!(elements[2].category(), ElementCategory::TopLevelSectionTitle);
        assert_eq!(elements[3].category(), ElementCategory::Unclassified);
    }

    #[test]
    fn order_regression_is_rejected_with_log_entry() {
        // A back-reference to an earlier item after a later one was accepted.
        let elements = run(FormType::TenQ, "<p>Part I</p><p>Item 2</p><p>Item 1</p>");
        assert_eq!(elements[1].category(), ElementCategory::TopLevelSectionTitle);
        assert_eq!(elements[2].category(), ElementCategory::Unclassified);
        assert!(
            elements[2]
                .processing_log()
                .entries()
                .iter()
                .any(|entry| entry.message.contains("does not advance"))
        );
    }

    #[test]
    fn part_context_carries_into_items() {
        let elements = run(FormType::TenQ, "<p>Part II</p><p>Item 1. Legal Proceedings</p>");
        match elements[1].kind() {
            ElementKind::TopLevelSectionTitle { identity, .. } => {
                assert_eq!(identity.identifier(), "part2item1");
            }
            other => panic!("expected section title, got {other:?}"),
        }
    }

    #[test]
    fn table_of_contents_does_not_win_over_real_heading() {
        let elements = run(
            FormType::TenQ,
            "<div><table><tr><td>Part I</td><td>3</td></tr></table></div><p>Part I</p>",
        );
        assert_eq!(elements[0].category(), ElementCategory::Table);
        assert_eq!(elements[1].category(), ElementCategory::TopLevelSectionTitle);
    }

    #[test]
    fn table_candidate_wins_when_no_other_exists() {
        let elements = run(
            FormType::TenQ,
            "<div><table><tr><td>Part I</td></tr></table></div><p>Plain text</p>",
        );
        assert_eq!(elements[0].category(), ElementCategory::TopLevelSectionTitle);
    }

    #[test]
    fn unknown_identifier_degrades_with_log_entry() {
        let elements = run(FormType::TenQ, "<p>Item 9. Mystery</p>");
        assert_eq!(elements[0].category(), ElementCategory::Unclassified);
        assert!(
            elements[0]
                .processing_log()
                .entries()
                .iter()
                .any(|entry| entry.message.contains("unrecognized section reference"))
        );
    }

    #[test]
    fn ten_k_items_resolve_without_part_headings() {
        let elements = run(FormType::TenK, "<p>Item 7A. Market Risk</p>");
        match elements[0].kind() {
            ElementKind::TopLevelSectionTitle { identity, .. } => {
                assert_eq!(identity.identifier(), "part2item7a");
            }
            other => panic!("expected section title, got {other:?}"),
        }
    }
}
