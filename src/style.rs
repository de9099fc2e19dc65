//! Inline CSS handling and text style detection.
//!
//! Filing HTML carries essentially all of its styling as inline `style`
//! attributes, so there is no stylesheet or selector matching here: a
//! declaration block parser, character-weighted style metrics, and the
//! [`TextStyle`] flags derived from them.

use std::collections::HashMap;

use cssparser::{Parser, ParserInput, Token};
use serde::Serialize;

/// Minimum percentage of characters a style must cover before the whole
/// block is considered to carry it.
pub const PREVALENCE_THRESHOLD: f64 = 80.0;

/// Parse a `style="…"` declaration block into ordered (property, value)
/// pairs.
///
/// Values are captured as raw source slices (so shorthands and multi-token
/// values survive), then lowercased and whitespace-collapsed. Malformed
/// declarations are skipped up to the next semicolon. Duplicate properties
/// are preserved in source order; cascade resolution decides which wins.
pub fn parse_style_attribute(css: &str) -> Vec<(String, String)> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let result: Result<(), cssparser::ParseError<'_, ()>> = parser.try_parse(|i| {
            let property = match i.next()? {
                Token::Ident(name) => name.to_string().to_ascii_lowercase(),
                _ => return Err(i.new_custom_error(())),
            };

            i.skip_whitespace();

            match i.next()? {
                Token::Colon => {}
                _ => return Err(i.new_custom_error(())),
            }

            i.skip_whitespace();

            let start = i.position();
            let mut end = i.position();
            loop {
                match i.next() {
                    Ok(Token::Semicolon) => break,
                    Ok(
                        Token::Function(_)
                        | Token::ParenthesisBlock
                        | Token::SquareBracketBlock
                        | Token::CurlyBracketBlock,
                    ) => {
                        let _ = i.parse_nested_block(consume_nested);
                        end = i.position();
                    }
                    Ok(_) => {
                        end = i.position();
                    }
                    Err(_) => break,
                }
            }

            let value = normalize_value(i.slice(start..end));
            if !value.is_empty() {
                declarations.push((property, value));
            }
            Ok(())
        });

        if result.is_err() {
            // Skip to next semicolon to recover
            loop {
                match parser.next() {
                    Ok(Token::Semicolon) => break,
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
        }
    }

    declarations
}

fn consume_nested<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<(), cssparser::ParseError<'i, ()>> {
    while parser.next().is_ok() {}
    Ok(())
}

fn normalize_value(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

// ============================================================================
// Style metrics
// ============================================================================

/// Character-weighted style coverage for a subtree.
///
/// Maps each effective (property, value) pair to the percentage of the
/// subtree's non-whitespace characters rendered with it.
#[derive(Debug, Clone, Default)]
pub struct StyleMetrics {
    entries: HashMap<(String, String), f64>,
}

impl StyleMetrics {
    pub(crate) fn from_counts(counts: HashMap<(String, String), usize>, total: usize) -> Self {
        if total == 0 {
            return StyleMetrics::default();
        }
        let entries = counts
            .into_iter()
            .map(|(key, chars)| (key, chars as f64 * 100.0 / total as f64))
            .collect();
        StyleMetrics { entries }
    }

    /// Coverage percentage for a (property, value) pair; 0 when absent.
    pub fn percentage(&self, property: &str, value: &str) -> f64 {
        self.entries
            .get(&(property.to_string(), value.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), f64)> {
        self.entries.iter().map(|(key, pct)| (key, *pct))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deterministic signature of the styles covering at least `threshold`
    /// percent of the text. Used to fingerprint repeating page headers.
    pub fn signature(&self, threshold: f64) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .entries
            .iter()
            .filter(|(_, pct)| **pct >= threshold)
            .map(|(key, _)| key.clone())
            .collect();
        entries.sort();
        entries
    }
}

// ============================================================================
// Text style flags
// ============================================================================

/// Visual emphasis detected on a block of text.
///
/// Distinct values rank title levels by first appearance, so this is `Eq`
/// and `Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextStyle {
    pub all_uppercase: bool,
    pub bold: bool,
    pub italic: bool,
    pub centered: bool,
    pub underline: bool,
}

impl TextStyle {
    /// Derive style flags from metrics and raw text.
    ///
    /// A CSS-driven flag is set when its qualifying values together cover at
    /// least `threshold` percent of the characters. `all_uppercase` is set
    /// when at least 80% of the alphabetic characters are uppercase.
    pub fn detect(metrics: &StyleMetrics, text: &str, threshold: f64) -> TextStyle {
        let mut bold = 0.0;
        let mut italic = 0.0;
        let mut centered = 0.0;
        let mut underline = 0.0;

        for ((property, value), pct) in metrics.iter() {
            match property.as_str() {
                "font-weight" if is_bold_value(value) => bold += pct,
                "font-style" if value == "italic" || value == "oblique" => italic += pct,
                "text-align" if value == "center" => centered += pct,
                "text-decoration" | "text-decoration-line"
                    if value.split_whitespace().any(|part| part == "underline") =>
                {
                    underline += pct
                }
                _ => {}
            }
        }

        TextStyle {
            all_uppercase: is_mostly_uppercase(text),
            bold: bold >= threshold,
            italic: italic >= threshold,
            centered: centered >= threshold,
            underline: underline >= threshold,
        }
    }

    /// True when no emphasis flag is set.
    pub fn is_plain(&self) -> bool {
        *self == TextStyle::default()
    }
}

fn is_bold_value(value: &str) -> bool {
    match value {
        "bold" | "bolder" => true,
        _ => value.parse::<f64>().is_ok_and(|weight| weight >= 600.0),
    }
}

fn is_mostly_uppercase(text: &str) -> bool {
    let mut letters = 0usize;
    let mut uppercase = 0usize;
    for c in text.chars() {
        if c.is_alphabetic() {
            letters += 1;
            if c.is_uppercase() {
                uppercase += 1;
            }
        }
    }
    letters > 0 && uppercase as f64 / letters as f64 >= 0.8
}
