use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetadataValue – a single free-form attribute value
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value: scalars, numeric arrays, mixed
/// sequences and nested mappings.
///
/// Serialized untagged so JSON files read naturally. Variant order matters
/// for deserialization: integers are tried before floats and numeric arrays
/// before mixed lists.
///
/// Non-finite floats are written as `"NaN"`, `"inf"` or `"-inf"`; a `String`
/// holding exactly one of those reloads as `Float`. A `List` of numbers
/// reloads as `Array`, so build lists with `From<Vec<MetadataValue>>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(#[serde(with = "super::float_repr")] f64),
    String(String),
    /// Numeric 1-D array (acquisition axes, counters, ...).
    Array(#[serde(with = "super::float_repr::vec")] Vec<f64>),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

/// Free-form attribute table, sorted by key.
pub type Metadata = BTreeMap<String, MetadataValue>;

impl MetadataValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            MetadataValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, MetadataValue>> {
        match self {
            MetadataValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key inside a `Map` value.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.as_map().and_then(|map| map.get(key))
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        write!(f, "{}", v as i64)
    } else {
        write!(f, "{v}")
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Null => write!(f, "null"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_float(f, *v)?;
                }
                write!(f, "]")
            }
            MetadataValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_nested(f, item)?;
                }
                write!(f, "]")
            }
            MetadataValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: ")?;
                    write_nested(f, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Strings nested in collections are quoted so whitespace stays visible.
fn write_nested(f: &mut fmt::Formatter<'_>, value: &MetadataValue) -> fmt::Result {
    match value {
        MetadataValue::String(s) => write!(f, "{s:?}"),
        other => write!(f, "{other}"),
    }
}

// -- Conversions --

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Integer(v as i64)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Integer(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}

impl From<Vec<f64>> for MetadataValue {
    fn from(v: Vec<f64>) -> Self {
        MetadataValue::Array(v)
    }
}

impl From<&[f64]> for MetadataValue {
    fn from(v: &[f64]) -> Self {
        MetadataValue::Array(v.to_vec())
    }
}

impl From<Array1<f64>> for MetadataValue {
    fn from(v: Array1<f64>) -> Self {
        MetadataValue::Array(v.to_vec())
    }
}

/// All-numeric sequences become `Array`.
impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(v: Vec<MetadataValue>) -> Self {
        match v.iter().map(MetadataValue::as_f64).collect::<Option<Vec<_>>>() {
            Some(values) => MetadataValue::Array(values),
            None => MetadataValue::List(v),
        }
    }
}

impl From<BTreeMap<String, MetadataValue>> for MetadataValue {
    fn from(v: BTreeMap<String, MetadataValue>) -> Self {
        MetadataValue::Map(v)
    }
}

impl<K: Into<String>, V: Into<MetadataValue>, const N: usize> From<[(K, V); N]> for MetadataValue {
    fn from(entries: [(K, V); N]) -> Self {
        MetadataValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nested_map() {
        let value = MetadataValue::from([
            ("nothing", MetadataValue::from(" ")),
            ("value", MetadataValue::from(6.8)),
        ]);
        assert_eq!(value.to_string(), "{nothing: \" \", value: 6.8}");
        assert_eq!(value.get("value").and_then(MetadataValue::as_f64), Some(6.8));
    }

    #[test]
    fn display_numeric_array() {
        let value = MetadataValue::from(vec![0.0, 1.0, 2.5]);
        assert_eq!(value.to_string(), "[0, 1, 2.5]");
    }

    #[test]
    fn json_is_untagged() {
        let value = MetadataValue::from([
            ("counts", MetadataValue::from(vec![1.5, 2.0])),
            ("label", MetadataValue::from("scan")),
            ("n", MetadataValue::from(3)),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"counts":[1.5,2.0],"label":"scan","n":3}"#);

        let back: MetadataValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn mixed_list_falls_back_to_list() {
        let back: MetadataValue = serde_json::from_str(r#"[1, "a", null]"#).unwrap();
        assert_eq!(
            back,
            MetadataValue::List(vec![
                MetadataValue::Integer(1),
                MetadataValue::from("a"),
                MetadataValue::Null,
            ])
        );
    }

    #[test]
    fn numeric_lists_become_arrays() {
        let value = MetadataValue::from(vec![MetadataValue::from(1.5), MetadataValue::from(2)]);
        assert_eq!(value, MetadataValue::Array(vec![1.5, 2.0]));

        let mixed = MetadataValue::from(vec![MetadataValue::from(1.5), MetadataValue::Null]);
        assert!(matches!(mixed, MetadataValue::List(_)));

        let back: MetadataValue =
            serde_json::from_str(&serde_json::to_string(&mixed).unwrap()).unwrap();
        assert_eq!(back, mixed);
    }

    #[test]
    fn non_finite_floats_keep_their_type() {
        let value = MetadataValue::from([
            ("gain", MetadataValue::from(f64::NAN)),
            ("limit", MetadataValue::from(f64::INFINITY)),
            ("trace", MetadataValue::from(vec![1.0, f64::NEG_INFINITY])),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"gain":"NaN","limit":"inf","trace":[1.0,"-inf"]}"#);

        let back: MetadataValue = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.get("gain"), Some(MetadataValue::Float(v)) if v.is_nan()));
        assert_eq!(back.get("limit"), Some(&MetadataValue::Float(f64::INFINITY)));
        assert_eq!(
            back.get("trace").and_then(MetadataValue::as_array),
            Some(&[1.0, f64::NEG_INFINITY][..])
        );
        assert_eq!(
            serde_json::from_str::<MetadataValue>(r#""scan""#).unwrap(),
            MetadataValue::from("scan")
        );
    }
}
