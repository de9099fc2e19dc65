//! # secant
//!
//! Semantic segmentation of SEC EDGAR filing HTML (10-Q/10-K) into a typed
//! sequence of document elements, and assembly of those elements into a
//! tree mirroring the filing's logical outline (Part → Item → Title →
//! Text).
//!
//! ## How it works
//!
//! Filing HTML is semantically flat: visually obvious structure (section
//! headings, titles, tables, footnotes) is expressed only through inline
//! styling. secant recovers that structure in two stages:
//!
//! 1. A **classification pipeline** of narrow, ordered steps progressively
//!    refines an initial "unclassified" element stream, using HTML
//!    structure, CSS styling statistics, and text patterns. Failures stay
//!    in-band: a bad element becomes an Error element, never an aborted
//!    parse.
//! 2. A **tree builder** reconstructs parent/child section relationships
//!    from the flat, ordered list using pluggable nesting rules.
//!
//! ## Quick Start
//!
//! ```
//! use secant::{ElementCategory, FormType, Parser};
//!
//! let html = "\
//!     <p>Part I</p>\
//!     <p>Item 1. Financial Statements</p>\
//!     <p>The accompanying notes are an integral part of these statements.</p>";
//!
//! let parser = Parser::for_form(FormType::TenQ);
//! let elements = parser.parse(html).unwrap();
//! assert_eq!(elements[0].category(), ElementCategory::TopLevelSectionTitle);
//! assert_eq!(elements[2].category(), ElementCategory::Text);
//!
//! // Or assemble the outline directly:
//! let tree = parser.parse_to_tree(html).unwrap();
//! assert_eq!(tree.roots().len(), 1);
//! assert_eq!(tree.roots()[0].text(), "Part I");
//! ```
//!
//! Retrieval of filings, export formats and visualization are collaborator
//! concerns; this crate only turns one HTML document into elements and a
//! tree.

pub mod dom;
pub mod element;
mod error;
pub mod html_tag;
mod parser;
pub mod section;
pub mod steps;
pub mod style;
pub mod tree;

pub use element::{ElementCategory, ElementKind, LogEntry, ProcessingLog, SemanticElement};
pub use error::{Error, Result};
pub use html_tag::HtmlTag;
pub use parser::{Parser, StepFactory};
pub use section::{FormType, SectionIdentity, SectionSpec};
pub use steps::{ProcessingStep, default_steps};
pub use style::{StyleMetrics, TextStyle};
pub use tree::{NestingRule, SemanticTree, TreeBuilder, TreeNode};
