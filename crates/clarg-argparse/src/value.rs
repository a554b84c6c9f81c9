//! Parsed values and the map that holds them.

use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A parsed value.
///
/// Strings come straight from argv; filters may turn them into other variants.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, an empty string, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Wrap scalars into a one-element list; lists stay as they are.
    pub(crate) fn into_list(self) -> Vec<Value> {
        match self {
            Self::List(items) => items,
            Self::Null => Vec::new(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Key in the values map: a parameter's attribute name, or the position of an
/// extra positional argument nobody declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Parsed values keyed by attribute name, in registration order, followed by
/// overflow positionals.
#[derive(Debug, Clone, Default)]
pub struct Values {
    map: IndexMap<Key, Value>,
    explicit: IndexSet<Key>,
    overflow: usize,
}

impl Values {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(&Key::Name(name.to_string()))
    }

    /// Extra positional argument by encounter order.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.map.get(&Key::Index(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Extra positional arguments, in order.
    pub fn overflow(&self) -> Vec<&Value> {
        (0..self.overflow)
            .filter_map(|i| self.get_index(i))
            .collect()
    }

    /// Set from argv rather than from a default.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(&Key::Name(name.to_string()))
    }

    /// Whether anything at all was taken from argv.
    pub fn has_explicit(&self) -> bool {
        self.explicit
            .iter()
            .filter_map(|k| self.map.get(k))
            .any(|v| !v.is_empty())
    }
}

impl Values {
    pub(crate) fn set_default(&mut self, name: &str, value: Value) {
        self.map.insert(Key::Name(name.to_string()), value);
    }

    pub(crate) fn set(&mut self, name: &str, value: Value) {
        let key = Key::Name(name.to_string());
        self.explicit.insert(key.clone());
        self.map.insert(key, value);
    }

    /// Merge into a list value. The first explicit value replaces the default.
    pub(crate) fn append(&mut self, name: &str, value: Value) {
        let key = Key::Name(name.to_string());
        let first = self.explicit.insert(key.clone());
        let slot = self.map.entry(key).or_insert(Value::Null);
        let mut items = if first {
            Vec::new()
        } else {
            std::mem::replace(slot, Value::Null).into_list()
        };
        items.extend(value.into_list());
        *slot = Value::List(items);
    }

    pub(crate) fn push_overflow(&mut self, value: Value) {
        let key = Key::Index(self.overflow);
        self.overflow += 1;
        self.explicit.insert(key.clone());
        self.map.insert(key, value);
    }

    pub(crate) fn without(&self, names: &[&str]) -> Values {
        let mut out = self.clone();
        for name in names {
            let key = Key::Name((*name).to_string());
            out.map.shift_remove(&key);
            out.explicit.shift_remove(&key);
        }
        out
    }
}

impl Serialize for Values {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.map.len()))?;
        for (key, value) in &self.map {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::Bool(false).is_empty());
        assert!(!Value::from("x").is_empty());
    }

    #[test]
    fn append_replaces_default_then_accumulates() {
        let mut values = Values::default();
        values.set_default("tags", Value::from(vec!["default"]));
        values.append("tags", Value::from("a"));
        values.append("tags", Value::from(vec!["b", "c"]));
        assert_eq!(values.get("tags"), Some(&Value::from(vec!["a", "b", "c"])));
        assert!(values.is_explicit("tags"));
    }

    #[test]
    fn append_keeps_registration_order() {
        let mut values = Values::default();
        values.set_default("a", Value::Null);
        values.set_default("b", Value::Null);
        values.append("a", Value::from("x"));
        let keys: Vec<String> = values.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn overflow_uses_successive_indexes() {
        let mut values = Values::default();
        values.push_overflow(Value::from("x"));
        values.push_overflow(Value::from("y"));
        assert_eq!(values.get_index(1), Some(&Value::from("y")));
        assert_eq!(values.overflow().len(), 2);
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let mut values = Values::default();
        values.set("force", Value::Bool(true));
        values.push_overflow(Value::from("extra"));
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"force":true,"0":"extra"}"#);
    }

    #[test]
    fn display_lists() {
        let v = Value::from(vec!["a", "b"]);
        assert_eq!(v.to_string(), "[a, b]");
    }
}
