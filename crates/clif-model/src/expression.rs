//! Tagged identifier expressions.
//!
//! An expression tells a consumer how to find a clinical variable in one
//! source dataset. It is an ordered list of terms, each of which is either an
//! exact identifier, a regular-expression pattern or a column reference. The
//! textual form joins the terms with `"; "`:
//!
//! ```text
//! 211; 220045            two exact item ids
//! regex:^albumin$        pattern match on a label column
//! col:heartrate          value lives in a wide-table column
//! ```
//!
//! The tag and the payload are carried verbatim; nothing here rewrites a
//! pattern or normalizes an identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between terms in the textual form.
pub const TERM_SEPARATOR: &str = "; ";
/// Tag marking a regular-expression term.
pub const REGEX_PREFIX: &str = "regex:";
/// Tag marking a column-reference term.
pub const COLUMN_PREFIX: &str = "col:";

/// A single element of an [`IdentifierExpression`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IdentifierTerm {
    /// Exact item identifier (numeric or string).
    Id(String),
    /// Regular expression matched against a label column.
    Pattern(String),
    /// Name of the column holding the value.
    Column(String),
}

impl IdentifierTerm {
    /// Parse one rendered term. Untagged text is an exact identifier.
    pub fn parse(raw: &str) -> Self {
        if let Some(pattern) = raw.strip_prefix(REGEX_PREFIX) {
            IdentifierTerm::Pattern(pattern.to_string())
        } else if let Some(column) = raw.strip_prefix(COLUMN_PREFIX) {
            IdentifierTerm::Column(column.to_string())
        } else {
            IdentifierTerm::Id(raw.to_string())
        }
    }

    /// Untagged payload.
    pub fn value(&self) -> &str {
        match self {
            IdentifierTerm::Id(v) | IdentifierTerm::Pattern(v) | IdentifierTerm::Column(v) => v,
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, IdentifierTerm::Id(_))
    }
}

impl fmt::Display for IdentifierTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierTerm::Id(id) => f.write_str(id),
            IdentifierTerm::Pattern(pattern) => write!(f, "{REGEX_PREFIX}{pattern}"),
            IdentifierTerm::Column(column) => write!(f, "{COLUMN_PREFIX}{column}"),
        }
    }
}

/// Coarse classification of an expression, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    /// No known mapping (empty cell).
    Unmapped,
    /// Exactly one exact identifier.
    Single,
    /// Two or more exact identifiers.
    List,
    /// Only pattern terms.
    Pattern,
    /// Only column references.
    Column,
    /// Any other combination of term kinds.
    Mixed,
}

impl ExpressionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionKind::Unmapped => "unmapped",
            ExpressionKind::Single => "single",
            ExpressionKind::List => "list",
            ExpressionKind::Pattern => "pattern",
            ExpressionKind::Column => "column",
            ExpressionKind::Mixed => "mixed",
        }
    }
}

/// Ordered list of identifier terms for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierExpression {
    terms: Vec<IdentifierTerm>,
}

impl IdentifierExpression {
    pub fn new(terms: Vec<IdentifierTerm>) -> Self {
        Self { terms }
    }

    /// Expression with no terms (rendered as an empty cell).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Expression made only of exact identifiers.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: ids
                .into_iter()
                .map(|id| IdentifierTerm::Id(id.into()))
                .collect(),
        }
    }

    /// Parse a rendered cell. Blank cells are empty expressions; empty
    /// segments between separators are skipped.
    pub fn parse(cell: &str) -> Self {
        if cell.trim().is_empty() {
            return Self::empty();
        }
        let terms = cell
            .split(TERM_SEPARATOR)
            .filter(|part| !part.is_empty())
            .map(IdentifierTerm::parse)
            .collect();
        Self { terms }
    }

    pub fn push(&mut self, term: IdentifierTerm) {
        self.terms.push(term);
    }

    pub fn terms(&self) -> &[IdentifierTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Exact identifiers, in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|term| match term {
            IdentifierTerm::Id(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|term| match term {
            IdentifierTerm::Pattern(p) => Some(p.as_str()),
            _ => None,
        })
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().filter_map(|term| match term {
            IdentifierTerm::Column(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn kind(&self) -> ExpressionKind {
        let ids = self.terms.iter().filter(|t| t.is_id()).count();
        let patterns = self.patterns().count();
        let columns = self.columns().count();
        match (ids, patterns, columns) {
            (0, 0, 0) => ExpressionKind::Unmapped,
            (1, 0, 0) => ExpressionKind::Single,
            (_, 0, 0) => ExpressionKind::List,
            (0, _, 0) => ExpressionKind::Pattern,
            (0, 0, _) => ExpressionKind::Column,
            _ => ExpressionKind::Mixed,
        }
    }

    /// Rendered cell value.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IdentifierExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                f.write_str(TERM_SEPARATOR)?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl FromIterator<IdentifierTerm> for IdentifierExpression {
    fn from_iter<T: IntoIterator<Item = IdentifierTerm>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}
