//! Keyword-based figure extraction from XBRL instances.
//!
//! This is a best-effort heuristic, not a taxonomy-aware parser. Elements are
//! visited in document order and the first one whose lowercased local name
//! contains a concept keyword and whose text parses as a number wins. Contexts
//! (period, consolidation scope, dimensions) are not inspected, so a figure
//! can come from a prior-year or non-consolidated fact.

use roxmltree::{Document, ParsingOptions};

use crate::error::{IngestError, Result};
use crate::models::ExtractedFigures;

/// Financial concepts pulled out of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concept {
    Revenue,
    OperatingIncome,
    NetIncome,
    Dividend,
}

impl Concept {
    /// Lowercase fragments matched against element local names
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Concept::Revenue => &["revenue", "netsales"],
            Concept::OperatingIncome => &["operatingincome"],
            Concept::NetIncome => &["profitloss", "netincome"],
            Concept::Dividend => &["dividend"],
        }
    }

    fn matches(self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.keywords().iter().any(|keyword| tag.contains(keyword))
    }
}

/// Parse a fact value such as `1,234,500`. Non-numeric text yields `None`.
pub fn parse_figure(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// First parseable value for `concept`, scanning in document order
pub fn extract_concept(document: &Document<'_>, concept: Concept) -> Option<f64> {
    document
        .descendants()
        .filter(|node| node.is_element())
        .filter(|node| concept.matches(node.tag_name().name()))
        .find_map(|node| node.text().and_then(parse_figure))
}

/// Parse an XBRL instance and pull out all four figures
pub fn extract_figures(xbrl: &[u8]) -> Result<ExtractedFigures> {
    let text = std::str::from_utf8(xbrl)
        .map_err(|e| IngestError::MalformedXml(format!("not valid UTF-8: {}", e)))?;
    let text = text.trim_start_matches('\u{feff}');

    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let document = Document::parse_with_options(text, options)?;

    Ok(ExtractedFigures {
        revenue: extract_concept(&document, Concept::Revenue),
        operating_income: extract_concept(&document, Concept::OperatingIncome),
        net_income: extract_concept(&document, Concept::NetIncome),
        dividend: extract_concept(&document, Concept::Dividend),
    })
}
