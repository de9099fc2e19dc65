//! Canonical top-level section tables for supported filing forms.
//!
//! Each form type has a fixed outline of Parts and Items. The tables are
//! immutable static data; a section's rank in its table is its canonical
//! order, which the section-detection step uses to enforce forward
//! progression through the document.

/// Filing form types with known section outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    TenQ,
    TenK,
}

/// One entry in a form's section outline.
#[derive(Debug, PartialEq, Eq)]
pub struct SectionSpec {
    /// Canonical identifier, e.g. `part1item2`.
    pub identifier: &'static str,
    /// Human-readable section title.
    pub title: &'static str,
    /// Outline depth: 0 for parts, 1 for items.
    pub level: u32,
}

/// Identity of a detected top-level section.
///
/// `Invalid` is the degrade-don't-fail sentinel for Part/Item patterns that
/// resolve to no entry in the form's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionIdentity {
    Known {
        spec: &'static SectionSpec,
        /// Rank within the form's outline.
        order: u32,
    },
    Invalid,
}

impl SectionIdentity {
    pub fn identifier(&self) -> &str {
        match self {
            SectionIdentity::Known { spec, .. } => spec.identifier,
            SectionIdentity::Invalid => "invalid",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SectionIdentity::Known { spec, .. } => spec.title,
            SectionIdentity::Invalid => "invalid section",
        }
    }

    /// Outline depth; the sentinel sits at item depth.
    pub fn level(&self) -> u32 {
        match self {
            SectionIdentity::Known { spec, .. } => spec.level,
            SectionIdentity::Invalid => 1,
        }
    }

    /// Canonical order, absent for the invalid sentinel.
    pub fn order(&self) -> Option<u32> {
        match self {
            SectionIdentity::Known { order, .. } => Some(*order),
            SectionIdentity::Invalid => None,
        }
    }
}

/// The section outline for a form type, in canonical order.
pub fn sections_for(form: FormType) -> &'static [SectionSpec] {
    match form {
        FormType::TenQ => SECTIONS_10Q,
        FormType::TenK => SECTIONS_10K,
    }
}

/// Resolve a canonical identifier against a form's outline.
pub fn lookup(form: FormType, identifier: &str) -> Option<SectionIdentity> {
    sections_for(form)
        .iter()
        .position(|spec| spec.identifier == identifier)
        .map(|index| SectionIdentity::Known {
            spec: &sections_for(form)[index],
            order: index as u32,
        })
}

/// Resolve a bare item token (e.g. `item7a`) when the part context is
/// missing or wrong. Succeeds only when the token is unique within the form;
/// 10-K items are globally numbered, 10-Q items are not.
pub fn lookup_item(form: FormType, item_token: &str) -> Option<SectionIdentity> {
    let sections = sections_for(form);
    let mut found = None;
    for (index, spec) in sections.iter().enumerate() {
        if spec.identifier.ends_with(item_token) {
            if found.is_some() {
                return None;
            }
            found = Some(SectionIdentity::Known {
                spec,
                order: index as u32,
            });
        }
    }
    found
}

/// Parse a roman numeral (case-insensitive), e.g. `IV` → 4.
pub fn parse_roman(text: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut prev = 0u32;
    for c in text.chars().rev() {
        let value = match c.to_ascii_lowercase() {
            'i' => 1,
            'v' => 5,
            'x' => 10,
            _ => return None,
        };
        if value < prev {
            total = total.checked_sub(value)?;
        } else {
            total += value;
            prev = value;
        }
    }
    if total == 0 { None } else { Some(total) }
}

static SECTIONS_10Q: &[SectionSpec] = &[
    SectionSpec { identifier: "part1", title: "Financial Information", level: 0 },
    SectionSpec { identifier: "part1item1", title: "Financial Statements", level: 1 },
    SectionSpec {
        identifier: "part1item2",
        title: "Management's Discussion and Analysis of Financial Condition and Results of Operations",
        level: 1,
    },
    SectionSpec {
        identifier: "part1item3",
        title: "Quantitative and Qualitative Disclosures About Market Risk",
        level: 1,
    },
    SectionSpec { identifier: "part1item4", title: "Controls and Procedures", level: 1 },
    SectionSpec { identifier: "part2", title: "Other Information", level: 0 },
    SectionSpec { identifier: "part2item1", title: "Legal Proceedings", level: 1 },
    SectionSpec { identifier: "part2item1a", title: "Risk Factors", level: 1 },
    SectionSpec {
        identifier: "part2item2",
        title: "Unregistered Sales of Equity Securities and Use of Proceeds",
        level: 1,
    },
    SectionSpec { identifier: "part2item3", title: "Defaults Upon Senior Securities", level: 1 },
    SectionSpec { identifier: "part2item4", title: "Mine Safety Disclosures", level: 1 },
    SectionSpec { identifier: "part2item5", title: "Other Information", level: 1 },
    SectionSpec { identifier: "part2item6", title: "Exhibits", level: 1 },
];

static SECTIONS_10K: &[SectionSpec] = &[
    SectionSpec { identifier: "part1", title: "Part I", level: 0 },
    SectionSpec { identifier: "part1item1", title: "Business", level: 1 },
    SectionSpec { identifier: "part1item1a", title: "Risk Factors", level: 1 },
    SectionSpec { identifier: "part1item1b", title: "Unresolved Staff Comments", level: 1 },
    SectionSpec { identifier: "part1item1c", title: "Cybersecurity", level: 1 },
    SectionSpec { identifier: "part1item2", title: "Properties", level: 1 },
    SectionSpec { identifier: "part1item3", title: "Legal Proceedings", level: 1 },
    SectionSpec { identifier: "part1item4", title: "Mine Safety Disclosures", level: 1 },
    SectionSpec { identifier: "part2", title: "Part II", level: 0 },
    SectionSpec {
        identifier: "part2item5",
        title: "Market for Registrant's Common Equity, Related Stockholder Matters and Issuer Purchases of Equity Securities",
        level: 1,
    },
    SectionSpec { identifier: "part2item6", title: "[Reserved]", level: 1 },
    SectionSpec {
        identifier: "part2item7",
        title: "Management's Discussion and Analysis of Financial Condition and Results of Operations",
        level: 1,
    },
    SectionSpec {
        identifier: "part2item7a",
        title: "Quantitative and Qualitative Disclosures About Market Risk",
        level: 1,
    },
    SectionSpec {
        identifier: "part2item8",
        title: "Financial Statements and Supplementary Data",
        level: 1,
    },
    SectionSpec {
        identifier: "part2item9",
        title: "Changes in and Disagreements with Accountants on Accounting and Financial Disclosure",
        level: 1,
    },
    SectionSpec { identifier: "part2item9a", title: "Controls and Procedures", level: 1 },
    SectionSpec { identifier: "part2item9b", title: "Other Information", level: 1 },
    SectionSpec {
        identifier: "part2item9c",
        title: "Disclosure Regarding Foreign Jurisdictions that Prevent Inspections",
        level: 1,
    },
    SectionSpec { identifier: "part3", title: "Part III", level: 0 },
    SectionSpec {
        identifier: "part3item10",
        title: "Directors, Executive Officers and Corporate Governance",
        level: 1,
    },
    SectionSpec { identifier: "part3item11", title: "Executive Compensation", level: 1 },
    SectionSpec {
        identifier: "part3item12",
        title: "Security Ownership of Certain Beneficial Owners and Management and Related Stockholder Matters",
        level: 1,
    },
    SectionSpec {
        identifier: "part3item13",
        title: "Certain Relationships and Related Transactions, and Director Independence",
        level: 1,
    },
    SectionSpec {
        identifier: "part3item14",
        title: "Principal Accountant Fees and Services",
        level: 1,
    },
    SectionSpec { identifier: "part4", title: "Part IV", level: 0 },
    SectionSpec {
        identifier: "part4item15",
        title: "Exhibits and Financial Statement Schedules",
        level: 1,
    },
    SectionSpec { identifier: "part4item16", title: "Form 10-K Summary", level: 1 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_identifier() {
        let identity = lookup(FormType::TenQ, "part1item2").expect("known section");
        assert_eq!(identity.identifier(), "part1item2");
        assert_eq!(identity.level(), 1);
        assert_eq!(identity.order(), Some(2));

        assert!(lookup(FormType::TenQ, "part9item9").is_none());
    }

    #[test]
    fn orders_follow_outline_position() {
        let part1 = lookup(FormType::TenQ, "part1").unwrap();
        let item1 = lookup(FormType::TenQ, "part1item1").unwrap();
        let part2 = lookup(FormType::TenQ, "part2").unwrap();
        assert!(part1.order() < item1.order());
        assert!(item1.order() < part2.order());
    }

    #[test]
    fn item_token_lookup_requires_uniqueness() {
        // 10-K items are globally numbered.
        let identity = lookup_item(FormType::TenK, "item7a").expect("unique item");
        assert_eq!(identity.identifier(), "part2item7a");

        // "item1" appears in both parts of a 10-Q.
        assert!(lookup_item(FormType::TenQ, "item1").is_none());
    }

    #[test]
    fn item_token_lookup_is_not_fooled_by_prefixes() {
        // "item1" must not match "item11" or "item1a".
        let identity = lookup_item(FormType::TenK, "item1").expect("unique item");
        assert_eq!(identity.identifier(), "part1item1");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(parse_roman("I"), Some(1));
        assert_eq!(parse_roman("ii"), Some(2));
        assert_eq!(parse_roman("IV"), Some(4));
        assert_eq!(parse_roman("ix"), Some(9));
        assert_eq!(parse_roman("q"), None);
        assert_eq!(parse_roman(""), None);
    }

    #[test]
    fn invalid_sentinel_has_no_order() {
        assert_eq!(SectionIdentity::Invalid.order(), None);
        assert_eq!(SectionIdentity::Invalid.identifier(), "invalid");
    }
}
