//! Render contexts.
//!
//! A [`Context`] maps tag names to the values substituted for them. Values
//! are JSON values so that contexts can be read from YAML or JSON files and
//! still carry numbers for filters such as `noun_plural(n)`; most callers
//! just insert strings.
//!
//! ```rust
//! use doctpl_render::Context;
//!
//! let mut ctx = Context::new();
//! ctx.insert("fio", "иванов иван петрович");
//! ctx.insert("days", 5);
//! assert!(ctx.contains("days"));
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;

use minijinja::Value;
use serde::{Deserialize, Serialize};

/// Tag to value mapping for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, serde_json::Value>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(tag.into(), value.into());
    }

    pub fn get(&self, tag: &str) -> Option<&serde_json::Value> {
        self.0.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops entries whose value is null or an empty string.
    pub fn without_empty(mut self) -> Self {
        self.0.retain(|_, v| match v {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.is_empty(),
            _ => true,
        });
        self
    }

    /// The context as a template engine value.
    pub fn to_value(&self) -> Value {
        Value::from_serialize(&self.0)
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> Extend<(K, V)> for Context
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Context {
    type Item = (String, serde_json::Value);
    type IntoIter = btree_map::IntoIter<String, serde_json::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_and_lookup() {
        let ctx: Context = [("a", "x"), ("b", "y")].into_iter().collect();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("a"), Some(&serde_json::json!("x")));
        assert_eq!(ctx.tags().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_without_empty() {
        let mut ctx = Context::new();
        ctx.insert("a", "");
        ctx.insert("b", serde_json::Value::Null);
        ctx.insert("c", 0);
        let ctx = ctx.without_empty();
        assert_eq!(ctx.tags().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_deserializes_from_yaml_mapping() {
        let ctx: Context = serde_yaml::from_str("fio: иванов\ndays: 3\n").unwrap();
        assert_eq!(ctx.get("days"), Some(&serde_json::json!(3)));
    }
}
