//! Effects an action has on the world when it succeeds

use std::fmt;

use goap_core::{Value, WorldState};
use tracing::warn;

/// Mutates world parameters in place. Applied once per action application.
pub trait Consequence: Send + Sync {
    fn apply(&self, params: &mut WorldState);

    /// Human-readable form used in logs
    fn describe(&self) -> String {
        "<consequence>".to_string()
    }
}

impl fmt::Debug for dyn Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Insert or overwrite a fact
#[derive(Debug, Clone)]
pub struct Set {
    pub key: String,
    pub value: Value,
}

impl Set {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Consequence for Set {
    fn apply(&self, params: &mut WorldState) {
        params.set(&self.key, self.value.clone());
    }

    fn describe(&self) -> String {
        format!("{} := {}", self.key, self.value)
    }
}

/// Add to a numeric fact. A missing fact counts as zero; ints stay ints when
/// the amount is integral.
#[derive(Debug, Clone)]
pub struct Add {
    pub key: String,
    pub amount: f64,
}

impl Add {
    pub fn new(key: impl Into<String>, amount: f64) -> Self {
        Self {
            key: key.into(),
            amount,
        }
    }
}

impl Consequence for Add {
    fn apply(&self, params: &mut WorldState) {
        let integral = self.amount.fract() == 0.0;
        let next = match params.get(&self.key) {
            None if integral => Value::Int(self.amount as i64),
            None => Value::Float(self.amount),
            Some(Value::Int(v)) if integral => Value::Int(v.saturating_add(self.amount as i64)),
            Some(Value::Int(v)) => Value::Float(*v as f64 + self.amount),
            Some(Value::Float(v)) => Value::Float(v + self.amount),
            Some(other) => {
                warn!(
                    "Cannot add {} to non-numeric fact '{}' ({})",
                    self.amount,
                    self.key,
                    other.type_name()
                );
                return;
            }
        };
        params.set(&self.key, next);
    }

    fn describe(&self) -> String {
        format!("{} += {}", self.key, self.amount)
    }
}

/// Remove a fact
#[derive(Debug, Clone)]
pub struct Remove {
    pub key: String,
}

impl Remove {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Consequence for Remove {
    fn apply(&self, params: &mut WorldState) {
        params.remove(&self.key);
    }

    fn describe(&self) -> String {
        format!("remove {}", self.key)
    }
}

/// Arbitrary mutation supplied by the host
pub struct Mutate<F> {
    label: String,
    effect: F,
}

impl<F> Mutate<F>
where
    F: Fn(&mut WorldState) + Send + Sync,
{
    pub fn new(label: impl Into<String>, effect: F) -> Self {
        Self {
            label: label.into(),
            effect,
        }
    }
}

impl<F> Consequence for Mutate<F>
where
    F: Fn(&mut WorldState) + Send + Sync,
{
    fn apply(&self, params: &mut WorldState) {
        (self.effect)(params)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// One `Set` consequence per fact of `effects`
pub fn from_state(effects: &WorldState) -> Vec<Box<dyn Consequence>> {
    effects
        .iter()
        .map(|(key, value)| Box::new(Set::new(key, value.clone())) as Box<dyn Consequence>)
        .collect()
}
