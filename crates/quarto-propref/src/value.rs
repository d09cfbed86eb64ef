/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Property tree value type.
//!
//! A property tree is an arbitrary nesting of mappings, lists and scalars.
//! Mappings keep their insertion order so that sibling references resolve
//! in the order the entries were written.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node of a property tree.
///
/// `Null` stands for both an explicit null and an absent value (for example
/// what a getter returns for an unknown key).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// A null/missing value.
    #[default]
    Null,

    /// A boolean value.
    Bool(bool),

    /// A numeric value (integer or float).
    Number(serde_json::Number),

    /// A string value. Only strings are scanned for reference markers.
    String(String),

    /// An ordered sequence of values.
    List(Vec<PropValue>),

    /// A string-keyed mapping, in insertion order.
    Map(IndexMap<String, PropValue>),
}

impl PropValue {
    /// Create an empty mapping.
    pub fn map() -> Self {
        PropValue::Map(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, PropValue>> {
        match self {
            PropValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a direct child of a mapping.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Get a nested field by path.
    ///
    /// For example, `get_path(&["dev", "siteUrl"])` on a Map containing
    /// `{"dev": {"siteUrl": "..."}}` returns the site URL. Lists are not
    /// indexed; only mappings are traversed.
    pub fn get_path(&self, path: &[&str]) -> Option<&PropValue> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.get(first).and_then(|v| v.get_path(rest)),
        }
    }

    /// Render this value as a string for inline substitution.
    ///
    /// - String: returned as-is
    /// - Number: JSON representation
    /// - Bool: "true" or "false"
    /// - Null: ""
    /// - List: rendered elements joined with ","
    /// - Map: compact JSON
    pub fn render(&self) -> String {
        match self {
            PropValue::String(s) => s.clone(),
            PropValue::Number(n) => n.to_string(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Null => String::new(),
            PropValue::List(items) => items
                .iter()
                .map(PropValue::render)
                .collect::<Vec<_>>()
                .join(","),
            PropValue::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Short name of the value kind, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            PropValue::Null => "null",
            PropValue::Bool(_) => "bool",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::List(_) => "list",
            PropValue::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for PropValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropValue::Null,
            serde_json::Value::Bool(b) => PropValue::Bool(b),
            serde_json::Value::Number(n) => PropValue::Number(n),
            serde_json::Value::String(s) => PropValue::String(s),
            serde_json::Value::Array(items) => {
                PropValue::List(items.into_iter().map(PropValue::from).collect())
            }
            serde_json::Value::Object(map) => PropValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, PropValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PropValue> for serde_json::Value {
    fn from(value: PropValue) -> Self {
        match value {
            PropValue::Null => serde_json::Value::Null,
            PropValue::Bool(b) => serde_json::Value::Bool(b),
            PropValue::Number(n) => serde_json::Value::Number(n),
            PropValue::String(s) => serde_json::Value::String(s),
            PropValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            PropValue::Map(map) => {
                serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Number(n.into())
    }
}

impl From<f64> for PropValue {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(PropValue::Null, PropValue::Number)
    }
}

impl FromIterator<(String, PropValue)> for PropValue {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        PropValue::Map(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let value = PropValue::from(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let keys: Vec<&str> = value
            .as_map()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_get_path() {
        let value = PropValue::from(json!({"dev": {"siteUrl": "s"}, "list": [1]}));

        assert_eq!(
            value.get_path(&["dev", "siteUrl"]),
            Some(&PropValue::from("s"))
        );
        assert_eq!(value.get_path(&["dev", "missing"]), None);
        assert_eq!(value.get_path(&["list", "0"]), None);
        assert_eq!(value.get_path(&[]), Some(&value));
    }

    #[test]
    fn test_render() {
        assert_eq!(PropValue::from("text").render(), "text");
        assert_eq!(PropValue::from(1i64).render(), "1");
        assert_eq!(PropValue::from(2.5).render(), "2.5");
        assert_eq!(PropValue::from(true).render(), "true");
        assert_eq!(PropValue::from(false).render(), "false");
        assert_eq!(PropValue::Null.render(), "");
        assert_eq!(PropValue::from(json!(["a", 1, null])).render(), "a,1,");
        assert_eq!(
            PropValue::from(json!({"b": 1, "a": [true]})).render(),
            r#"{"b":1,"a":[true]}"#
        );
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = "name: site\nport: 8080\nflags: [true, ~]\nnested:\n  ratio: 0.5\n";
        let value: PropValue = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(value.get("name"), Some(&PropValue::from("site")));
        assert_eq!(value.get("port").and_then(PropValue::as_i64), Some(8080));
        assert_eq!(
            value.get("flags"),
            Some(&PropValue::List(vec![PropValue::Bool(true), PropValue::Null]))
        );
        assert_eq!(value.get_path(&["nested", "ratio"]), Some(&PropValue::from(0.5)));
    }

    #[test]
    fn test_json_round_trip_through_serde() {
        let source = json!({"a": {"b": [1, "two", false, null]}});
        let value: PropValue = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(serde_json::Value::from(value), source);
    }
}
