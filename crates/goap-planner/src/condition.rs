//! Preconditions and goal predicates

use std::fmt;

use goap_core::{Value, WorldState};
use serde::{Deserialize, Serialize};

/// A predicate over world parameters. Evaluation must not have side effects.
pub trait Condition: Send + Sync {
    fn validate(&self, params: &WorldState) -> bool;

    /// Human-readable form used in logs
    fn describe(&self) -> String {
        "<condition>".to_string()
    }
}

impl fmt::Debug for dyn Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Comparison {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Less => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        }
    }
}

/// Fact is present and equal to `value`
#[derive(Debug, Clone)]
pub struct Equals {
    pub key: String,
    pub value: Value,
}

impl Equals {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Condition for Equals {
    fn validate(&self, params: &WorldState) -> bool {
        params.get(&self.key) == Some(&self.value)
    }

    fn describe(&self) -> String {
        format!("{} = {}", self.key, self.value)
    }
}

/// Numeric fact compared against a constant. Missing or non-numeric facts fail.
#[derive(Debug, Clone)]
pub struct Compare {
    pub key: String,
    pub op: Comparison,
    pub value: f64,
}

impl Compare {
    pub fn new(key: impl Into<String>, op: Comparison, value: f64) -> Self {
        Self {
            key: key.into(),
            op,
            value,
        }
    }
}

impl Condition for Compare {
    fn validate(&self, params: &WorldState) -> bool {
        params
            .get_number(&self.key)
            .is_some_and(|actual| self.op.holds(actual, self.value))
    }

    fn describe(&self) -> String {
        format!("{} {} {}", self.key, self.op.symbol(), self.value)
    }
}

/// Fact is not present at all
#[derive(Debug, Clone)]
pub struct Absent {
    pub key: String,
}

impl Absent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Condition for Absent {
    fn validate(&self, params: &WorldState) -> bool {
        !params.contains(&self.key)
    }

    fn describe(&self) -> String {
        format!("{} absent", self.key)
    }
}

/// Negation of another condition
pub struct Not(pub Box<dyn Condition>);

impl Condition for Not {
    fn validate(&self, params: &WorldState) -> bool {
        !self.0.validate(params)
    }

    fn describe(&self) -> String {
        format!("not ({})", self.0.describe())
    }
}

/// Arbitrary predicate supplied by the host
pub struct Predicate<F> {
    label: String,
    check: F,
}

impl<F> Predicate<F>
where
    F: Fn(&WorldState) -> bool + Send + Sync,
{
    pub fn new(label: impl Into<String>, check: F) -> Self {
        Self {
            label: label.into(),
            check,
        }
    }
}

impl<F> Condition for Predicate<F>
where
    F: Fn(&WorldState) -> bool + Send + Sync,
{
    fn validate(&self, params: &WorldState) -> bool {
        (self.check)(params)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// One `Equals` condition per fact of `desired`
pub fn from_state(desired: &WorldState) -> Vec<Box<dyn Condition>> {
    desired
        .iter()
        .map(|(key, value)| Box::new(Equals::new(key, value.clone())) as Box<dyn Condition>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_requires_same_type() {
        let ws = WorldState::new().with("wood", 2);
        assert!(Equals::new("wood", 2).validate(&ws));
        assert!(!Equals::new("wood", 2.0).validate(&ws));
        assert!(!Equals::new("stone", 2).validate(&ws));
    }

    #[test]
    fn test_compare_numeric() {
        let ws = WorldState::new().with("gold", 10).with("health", 0.4);
        assert!(Compare::new("gold", Comparison::GreaterOrEqual, 10.0).validate(&ws));
        assert!(!Compare::new("gold", Comparison::Greater, 10.0).validate(&ws));
        assert!(Compare::new("health", Comparison::Less, 0.5).validate(&ws));
        assert!(Compare::new("health", Comparison::NotEqual, 1.0).validate(&ws));
    }

    #[test]
    fn test_compare_missing_or_non_numeric_fails() {
        let ws = WorldState::new().with("name", "bob");
        assert!(!Compare::new("name", Comparison::NotEqual, 0.0).validate(&ws));
        assert!(!Compare::new("missing", Comparison::Less, 1.0).validate(&ws));
    }

    #[test]
    fn test_absent_and_not() {
        let ws = WorldState::from_bool("alarm", false);
        assert!(Absent::new("intruder").validate(&ws));
        assert!(!Absent::new("alarm").validate(&ws));

        let not = Not(Box::new(Equals::new("alarm", true)));
        assert!(not.validate(&ws));
        assert_eq!(not.describe(), "not (alarm = true)");
    }

    #[test]
    fn test_predicate() {
        let many_logs = Predicate::new("logs > planks", |ws: &WorldState| {
            ws.get_int("logs").unwrap_or(0) > ws.get_int("planks").unwrap_or(0)
        });
        let ws = WorldState::new().with("logs", 3).with("planks", 1);
        assert!(many_logs.validate(&ws));
        assert!(!many_logs.validate(&WorldState::new()));
    }

    #[test]
    fn test_from_state() {
        let desired = WorldState::new().with("a", true).with("b", 1);
        let conditions = from_state(&desired);
        assert_eq!(conditions.len(), 2);
        assert!(conditions.iter().all(|c| c.validate(&desired)));
        assert!(!conditions[0].validate(&WorldState::new()));
    }

    #[test]
    fn test_comparison_symbols_parse() {
        #[derive(Deserialize)]
        struct Doc {
            op: Comparison,
        }
        let doc: Doc = toml::from_str("op = \">=\"").unwrap();
        assert_eq!(doc.op, Comparison::GreaterOrEqual);
    }
}
