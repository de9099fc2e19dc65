//! Page number and page header pruning.
//!
//! Filings repeat their page furniture dozens of times, so this is a
//! cross-document frequency heuristic rather than single-element logic.
//! Pass one collects short-text candidates: digit-bearing texts are counted
//! by their digit-stripped skeleton (page numbers change every page, the
//! surrounding text does not), and every short text is counted together
//! with its style signature (headers repeat verbatim in the same style).
//! Pass two reclassifies anything matching a frequent-enough candidate as
//! Irrelevant.

use std::collections::HashMap;

use crate::Result;
use crate::element::{ElementCategory, ElementKind, SemanticElement};
use crate::steps::{ElementwiseStep, RunGuard, StepContext, StepFilter};
use crate::style::PREVALENCE_THRESHOLD;

const MAX_CANDIDATE_LEN: usize = 100;

/// Minimum occurrences before a candidate counts as page furniture. Tuned
/// empirically; configurable because the right value depends on document
/// length.
pub const DEFAULT_MIN_OCCURRENCES: u32 = 5;

type HeaderKey = (String, Vec<(String, String)>);

#[derive(Debug)]
pub struct PageMetaStep {
    guard: RunGuard,
    min_occurrences: u32,
    number_counts: HashMap<String, u32>,
    header_counts: HashMap<HeaderKey, u32>,
}

impl PageMetaStep {
    pub fn new() -> Self {
        PageMetaStep::with_min_occurrences(DEFAULT_MIN_OCCURRENCES)
    }

    pub fn with_min_occurrences(min_occurrences: u32) -> Self {
        PageMetaStep {
            guard: RunGuard::default(),
            min_occurrences,
            number_counts: HashMap::new(),
            header_counts: HashMap::new(),
        }
    }
}

impl Default for PageMetaStep {
    fn default() -> Self {
        PageMetaStep::new()
    }
}

/// Digit runs replaced by `#`, for texts mixing digits into stable
/// surroundings. Purely numeric texts have no stable skeleton.
fn number_skeleton(text: &str) -> Option<String> {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let all_digits = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .all(|c| c.is_ascii_digit());
    if !has_digit || all_digits {
        return None;
    }

    let mut skeleton = String::with_capacity(text.len());
    let mut in_digits = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            if !in_digits {
                skeleton.push('#');
                in_digits = true;
            }
        } else {
            skeleton.push(c);
            in_digits = false;
        }
    }
    Some(skeleton)
}

fn is_candidate(element: &SemanticElement) -> bool {
    let text = element.text();
    !text.is_empty() && text.chars().count() <= MAX_CANDIDATE_LEN
}

fn header_key(element: &SemanticElement) -> HeaderKey {
    (
        element.text().to_string(),
        element
            .tag()
            .text_styles_metrics()
            .signature(PREVALENCE_THRESHOLD),
    )
}

impl ElementwiseStep for PageMetaStep {
    fn name(&self) -> &'static str {
        "page-meta"
    }

    fn guard(&mut self) -> &mut RunGuard {
        &mut self.guard
    }

    fn filter(&self) -> StepFilter {
        StepFilter::only(vec![
            ElementCategory::Unclassified,
            ElementCategory::Text,
            ElementCategory::Highlighted,
            ElementCategory::Title,
        ])
    }

    fn passes(&self) -> usize {
        2
    }

    fn process_element(
        &mut self,
        element: SemanticElement,
        ctx: &StepContext,
    ) -> Result<SemanticElement> {
        if !is_candidate(&element) {
            return Ok(element);
        }

        if ctx.pass == 0 {
            if let Some(skeleton) = number_skeleton(element.text()) {
                *self.number_counts.entry(skeleton).or_insert(0) += 1;
            }
            *self.header_counts.entry(header_key(&element)).or_insert(0) += 1;
            return Ok(element);
        }

        let number_hits = number_skeleton(element.text())
            .and_then(|skeleton| self.number_counts.get(&skeleton).copied())
            .unwrap_or(0);
        if number_hits >= self.min_occurrences {
            return Ok(element.reclassify(
                ElementKind::Irrelevant,
                "page-meta",
                format!("recurring page number pattern ({number_hits} occurrences)"),
            ));
        }

        let header_hits = self
            .header_counts
            .get(&header_key(&element))
            .copied()
            .unwrap_or(0);
        if header_hits >= self.min_occurrences {
            return Ok(element.reclassify(
                ElementKind::Irrelevant,
                "page-meta",
                format!("recurring page header ({header_hits} occurrences)"),
            ));
        }

        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::ProcessingStep;
    use crate::steps::tests::elements_from;

    #[test]
    fn recurring_page_numbers_become_irrelevant() {
        let html: String = (1..=5)
            .map(|page| format!("<p>Apple Inc. | Form 10-Q | Page {page}</p>"))
            .chain(std::iter::once("<p>Real prose content here.</p>".to_string()))
            .collect();
        let elements = PageMetaStep::new().process(elements_from(&html)).unwrap();

        for element in &elements[..5] {
            assert_eq!(element.category(), ElementCategory::Irrelevant);
        }
        assert_eq!(elements[5].category(), ElementCategory::Unclassified);
    }

    #[test]
    fn recurring_headers_match_text_and_style() {
        let repeated = r#"<p style="font-weight: bold">Apple Inc.</p>"#.repeat(5);
        let html = format!(r#"{repeated}<p style="font-weight: bold">Apple Inc. once more</p>"#);
        let elements = PageMetaStep::new().process(elements_from(&html)).unwrap();

        for element in &elements[..5] {
            assert_eq!(element.category(), ElementCategory::Irrelevant);
        }
        // Different text, same style: not a header.
        assert_eq!(elements[5].category(), ElementCategory::Unclassified);
    }

    #[test]
    fn threshold_is_configurable() {
        let html = "<p>Footer text</p>".repeat(3);
        let elements = PageMetaStep::with_min_occurrences(3)
            .process(elements_from(&html))
            .unwrap();
        assert!(
            elements
                .iter()
                .all(|e| e.category() == ElementCategory::Irrelevant)
        );
    }

    #[test]
    fn long_text_is_never_a_candidate() {
        let paragraph = format!("<p>{}</p>", "long sentence ".repeat(20));
        let html = paragraph.repeat(6);
        let elements = PageMetaStep::new().process(elements_from(&html)).unwrap();
        assert!(
            elements
                .iter()
                .all(|e| e.category() == ElementCategory::Unclassified)
        );
    }

    #[test]
    fn purely_numeric_text_has_no_skeleton() {
        assert_eq!(number_skeleton("23"), None);
        assert_eq!(number_skeleton("Page 23"), Some("Page #".to_string()));
        assert_eq!(number_skeleton("prose"), None);
    }
}
