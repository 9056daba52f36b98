//! Record and value types
//!
//! A record is a flat, immutable mapping from unqualified field name to a
//! number or a string. Result rows carry qualified keys and keep column
//! order when serialized.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single field value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }

    /// Total order used for sorting.
    ///
    /// Numbers compare numerically and strings lexically; any number
    /// sorts before any string. Agrees with `write_canonical`: -0.0 and
    /// 0.0 are equal.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }

    /// Appends a canonical, type-tagged encoding of this value.
    ///
    /// Two values produce the same encoding iff they are equal.
    pub fn write_canonical(&self, out: &mut String) {
        match self {
            FieldValue::Number(n) => {
                out.push('n');
                // -0.0 and 0.0 compare equal
                let n = if *n == 0.0 { 0.0 } else { *n };
                out.push_str(&n.to_bits().to_string());
            }
            FieldValue::Text(s) => {
                out.push('s');
                out.push_str(&s.len().to_string());
                out.push(':');
                out.push_str(s);
            }
        }
        out.push(';');
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Number(n) => {
                // Integral values serialize as integers (90.0 -> 90)
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// One course section or room
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Returns the value of an unqualified field
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// An output row: ordered `(column, value)` pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    entries: Vec<(String, FieldValue)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column; the caller keeps keys unique
    pub fn push(&mut self, column: impl Into<String>, value: FieldValue) {
        self.entries.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_deserialize() {
        let v: FieldValue = serde_json::from_value(json!(87.5)).unwrap();
        assert_eq!(v, FieldValue::Number(87.5));
        let v: FieldValue = serde_json::from_value(json!("cpsc")).unwrap();
        assert_eq!(v, FieldValue::Text("cpsc".into()));
        assert!(serde_json::from_value::<FieldValue>(json!(true)).is_err());
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        assert_eq!(serde_json::to_value(FieldValue::Number(90.0)).unwrap(), json!(90));
        assert_eq!(
            serde_json::to_value(FieldValue::Number(1.67)).unwrap(),
            json!(1.67)
        );
    }

    #[test]
    fn test_compare() {
        let a = FieldValue::from(1.0);
        let b = FieldValue::from(2.0);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(
            FieldValue::from("b").compare(&FieldValue::from("a")),
            Ordering::Greater
        );
        assert_eq!(a.compare(&FieldValue::from("a")), Ordering::Less);
    }

    #[test]
    fn test_canonical_distinguishes_types() {
        let mut num = String::new();
        FieldValue::from(1.0).write_canonical(&mut num);
        let mut text = String::new();
        FieldValue::from("1").write_canonical(&mut text);
        assert_ne!(num, text);

        let mut zero = String::new();
        FieldValue::from(0.0).write_canonical(&mut zero);
        let mut neg_zero = String::new();
        FieldValue::from(-0.0).write_canonical(&mut neg_zero);
        assert_eq!(zero, neg_zero);
    }

    #[test]
    fn test_compare_signed_zero_equal() {
        let zero = FieldValue::from(0.0);
        let neg_zero = FieldValue::from(-0.0);
        assert_eq!(zero.compare(&neg_zero), Ordering::Equal);
        assert_eq!(neg_zero.compare(&zero), Ordering::Equal);
        assert_eq!(neg_zero.compare(&FieldValue::from(-1.0)), Ordering::Greater);
    }

    #[test]
    fn test_row_preserves_column_order() {
        let mut row = ResultRow::new();
        row.push("courses_dept", FieldValue::from("cpsc"));
        row.push("maxAvg", FieldValue::from(90.0));
        row.push("courses_avg", FieldValue::from(85.25));

        let text = serde_json::to_string(&row).unwrap();
        assert_eq!(text, r#"{"courses_dept":"cpsc","maxAvg":90,"courses_avg":85.25}"#);
        assert_eq!(row.get("maxAvg"), Some(&FieldValue::Number(90.0)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_record_roundtrip_json() {
        let record: Record =
            serde_json::from_value(json!({"dept": "cpsc", "avg": 80})).unwrap();
        assert_eq!(record.get("avg"), Some(&FieldValue::Number(80.0)));
        assert_eq!(record.len(), 2);
    }
}
