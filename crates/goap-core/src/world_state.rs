//! World state representation for GOAP planning

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Set of facts describing the world at one point in time.
///
/// Facts are kept ordered by key, so two states with the same contents are
/// equal, hash the same and iterate in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldState {
    facts: BTreeMap<String, Value>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            facts: BTreeMap::new(),
        }
    }

    /// Create a WorldState with a single bool fact
    pub fn from_bool(key: &str, val: bool) -> Self {
        let mut ws = Self::new();
        ws.set_bool(key, val);
        ws
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, val: impl Into<Value>) -> Self {
        self.set(key, val);
        self
    }

    pub fn set(&mut self, key: &str, val: impl Into<Value>) {
        self.facts.insert(key.to_string(), val.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.facts.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.facts.remove(key)
    }

    pub fn set_bool(&mut self, key: &str, val: bool) {
        self.set(key, Value::Bool(val));
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn set_int(&mut self, key: &str, val: i64) {
        self.set(key, Value::Int(val));
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn set_float(&mut self, key: &str, val: f64) {
        self.set(key, Value::Float(val));
    }

    /// Numeric fact as `f64`, accepting both ints and floats
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn set_text(&mut self, key: &str, val: impl Into<String>) {
        self.set(key, Value::Text(val.into()));
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of facts
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, val)) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, val)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_set_get_bool() {
        let mut ws = WorldState::new();
        ws.set_bool("hungry", true);
        assert_eq!(ws.get_bool("hungry"), Some(true));
        assert_eq!(ws.get_bool("missing"), None);
    }

    #[test]
    fn test_typed_getters_reject_other_variants() {
        let mut ws = WorldState::new();
        ws.set_int("gold", 12);
        ws.set_float("health", 0.75);
        ws.set_text("stance", "crouched");
        assert_eq!(ws.get_int("gold"), Some(12));
        assert_eq!(ws.get_bool("gold"), None);
        assert_eq!(ws.get_number("gold"), Some(12.0));
        assert_eq!(ws.get_number("health"), Some(0.75));
        assert_eq!(ws.get_text("stance"), Some("crouched"));
        assert_eq!(ws.get_number("stance"), None);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = WorldState::new().with("x", 1).with("y", true);
        let b = WorldState::new().with("y", true).with("x", 1);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_display_is_sorted() {
        let ws = WorldState::new().with("b", 2).with("a", "oak");
        assert_eq!(ws.to_string(), "{a: \"oak\", b: 2}");
    }

    #[test]
    fn test_toml_round_trip_keeps_types() {
        let ws = WorldState::new()
            .with("has_axe", true)
            .with("wood", 3)
            .with("stamina", 0.5);
        let text = toml::to_string(&ws).unwrap();
        let back: WorldState = toml::from_str(&text).unwrap();
        assert_eq!(back, ws);
    }
}
