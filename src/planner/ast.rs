//! Query plan structures
//!
//! Defines the typed representation produced by the parser. A plan is
//! built once per query and only read afterwards.

use std::fmt;

use regex::Regex;

use crate::schema::FieldRef;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    LessThan,
    GreaterThan,
    Equals,
    Matches,
}

impl ComparisonOp {
    /// Parses a filter key; returns None for non-comparison keys
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "LESS_THAN" => Some(ComparisonOp::LessThan),
            "GREATER_THAN" => Some(ComparisonOp::GreaterThan),
            "EQUALS" => Some(ComparisonOp::Equals),
            "MATCHES" => Some(ComparisonOp::Matches),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::LessThan => "LESS_THAN",
            ComparisonOp::GreaterThan => "GREATER_THAN",
            ComparisonOp::Equals => "EQUALS",
            ComparisonOp::Matches => "MATCHES",
        }
    }
}

/// Composite operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    AllOf,
    AnyOf,
}

impl LogicalOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ALL_OF" => Some(LogicalOp::AllOf),
            "ANY_OF" => Some(LogicalOp::AnyOf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::AllOf => "ALL_OF",
            LogicalOp::AnyOf => "ANY_OF",
        }
    }
}

/// A wildcard pattern for MATCHES, compiled to an anchored regex.
///
/// `*` may only appear as the first and/or last character.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compiles a pattern; returns the reason on failure
    pub fn compile(raw: &str) -> Result<Self, String> {
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() >= 3 && chars[1..chars.len() - 1].contains(&'*') {
            return Err(format!(
                "Invalid pattern '{}': '*' is only allowed at the start or end",
                raw
            ));
        }

        let leading = raw.starts_with('*');
        let trailing = raw.len() > 1 && raw.ends_with('*');
        let start = if leading { 1 } else { 0 };
        let end = if trailing { raw.len() - 1 } else { raw.len() };
        let literal = if start <= end { &raw[start..end] } else { "" };

        let mut pattern = String::with_capacity(literal.len() + 8);
        pattern.push('^');
        if leading {
            pattern.push_str("(?s:.*)");
        }
        pattern.push_str(&regex::escape(literal));
        if trailing {
            pattern.push_str("(?s:.*)");
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| format!("Invalid pattern '{}': {}", raw, e))?;
        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Text(String),
    Pattern(WildcardPattern),
}

/// Leaf filter node: `field <op> operand`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: FieldRef,
    pub op: ComparisonOp,
    pub operand: Operand,
    pub negated: bool,
}

/// Inner filter node combining child nodes with ALL_OF / ANY_OF
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub op: LogicalOp,
    pub composites: Vec<Composite>,
    pub comparisons: Vec<Comparison>,
    pub negated: bool,
}

/// Root of a filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Comparison(Comparison),
    Composite(Composite),
}

/// Aggregate operations available in APPLY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Max,
    Min,
    Avg,
    Sum,
    Count,
}

impl AggregateOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "MAX" => Some(AggregateOp::Max),
            "MIN" => Some(AggregateOp::Min),
            "AVG" => Some(AggregateOp::Avg),
            "SUM" => Some(AggregateOp::Sum),
            "COUNT" => Some(AggregateOp::Count),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateOp::Max => "MAX",
            AggregateOp::Min => "MIN",
            AggregateOp::Avg => "AVG",
            AggregateOp::Sum => "SUM",
            AggregateOp::Count => "COUNT",
        }
    }

    /// COUNT works on any field; the rest need numbers
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, AggregateOp::Count)
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One APPLY entry: `name = op(target)`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub name: String,
    pub op: AggregateOp,
    pub target: FieldRef,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ASCENDING" => Some(SortDirection::Ascending),
            "DESCENDING" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Sort specification: direction plus ordered keys (column names)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub direction: SortDirection,
    pub keys: Vec<String>,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            direction: SortDirection::Ascending,
            keys: vec![key.into()],
        }
    }

    pub fn new(direction: SortDirection, keys: Vec<String>) -> Self {
        Self { direction, keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Fully validated query, ready for execution
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Dataset the query runs against
    pub dataset_id: String,
    /// Filter tree; None matches every record
    pub filter: Option<FilterNode>,
    /// Projected columns in output order
    pub columns: Vec<String>,
    /// Sort order (empty keys = input order)
    pub sort: SortSpec,
    /// Group-by fields (empty = no grouping)
    pub group: Vec<FieldRef>,
    /// Aggregate columns computed per group
    pub aggregates: Vec<AggregateSpec>,
}

impl QueryPlan {
    pub fn is_grouped(&self) -> bool {
        !self.group.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_keys() {
        assert_eq!(ComparisonOp::from_key("MATCHES"), Some(ComparisonOp::Matches));
        assert_eq!(ComparisonOp::from_key("IS"), None);
        assert_eq!(LogicalOp::from_key("ANY_OF"), Some(LogicalOp::AnyOf));
        assert_eq!(AggregateOp::from_key("COUNT"), Some(AggregateOp::Count));
        assert_eq!(SortDirection::from_key("DOWN"), None);
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }

    #[test]
    fn test_wildcard_contains() {
        let p = WildcardPattern::compile("*abc*").unwrap();
        assert!(p.is_match("xxabcyy"));
        assert!(p.is_match("abc"));
        assert!(!p.is_match("ab"));
    }

    #[test]
    fn test_wildcard_prefix_suffix() {
        assert!(WildcardPattern::compile("abc*").unwrap().is_match("abcdef"));
        assert!(!WildcardPattern::compile("abc*").unwrap().is_match("xabc"));
        assert!(WildcardPattern::compile("*abc").unwrap().is_match("xabc"));
        assert!(!WildcardPattern::compile("*abc").unwrap().is_match("abcx"));
    }

    #[test]
    fn test_wildcard_exact_and_case_sensitive() {
        let p = WildcardPattern::compile("cpsc").unwrap();
        assert!(p.is_match("cpsc"));
        assert!(!p.is_match("CPSC"));
        assert!(!p.is_match("cpsc1"));
    }

    #[test]
    fn test_wildcard_interior_star_rejected() {
        assert!(WildcardPattern::compile("a*b*c").is_err());
        assert!(WildcardPattern::compile("a*c").is_err());
    }

    #[test]
    fn test_wildcard_escapes_regex_metacharacters() {
        let p = WildcardPattern::compile("a.c*").unwrap();
        assert!(p.is_match("a.cde"));
        assert!(!p.is_match("abcde"));
    }

    #[test]
    fn test_wildcard_star_only() {
        assert!(WildcardPattern::compile("*").unwrap().is_match(""));
        assert!(WildcardPattern::compile("**").unwrap().is_match("anything"));
        assert!(WildcardPattern::compile("").unwrap().is_match(""));
        assert!(!WildcardPattern::compile("").unwrap().is_match("a"));
    }

    #[test]
    fn test_aggregate_numeric_requirement() {
        assert!(AggregateOp::Avg.requires_numeric());
        assert!(!AggregateOp::Count.requires_numeric());
    }
}
