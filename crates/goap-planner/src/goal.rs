//! GOAP goal definitions

use std::fmt;

use goap_core::WorldState;

use crate::condition::{self, Condition};

/// A set of conditions the agent wants to hold, with a priority
pub struct Goal {
    pub name: String,
    pub conditions: Vec<Box<dyn Condition>>,
    pub priority: f32,
}

impl Goal {
    pub fn new(name: impl Into<String>, priority: f32) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            priority,
        }
    }

    /// Goal satisfied when every fact of `desired` holds
    pub fn from_state(name: impl Into<String>, desired: &WorldState, priority: f32) -> Self {
        Self {
            name: name.into(),
            conditions: condition::from_state(desired),
            priority,
        }
    }

    pub fn with_condition(mut self, condition: impl Condition + 'static) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn is_satisfied(&self, state: &WorldState) -> bool {
        self.conditions.iter().all(|c| c.validate(state))
    }

    /// Number of conditions that do not hold yet
    pub fn unsatisfied_count(&self, state: &WorldState) -> usize {
        self.conditions.iter().filter(|c| !c.validate(state)).count()
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("priority", &self.priority)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Compare, Comparison};

    #[test]
    fn test_empty_goal_is_satisfied() {
        assert!(Goal::new("nothing", 0.0).is_satisfied(&WorldState::new()));
    }

    #[test]
    fn test_from_state() {
        let goal = Goal::from_state(
            "stocked",
            &WorldState::new().with("has_wood", true).with("has_food", true),
            0.5,
        );
        let ws = WorldState::from_bool("has_wood", true);
        assert!(!goal.is_satisfied(&ws));
        assert_eq!(goal.unsatisfied_count(&ws), 1);

        let ws = ws.with("has_food", true);
        assert!(goal.is_satisfied(&ws));
        assert_eq!(goal.unsatisfied_count(&ws), 0);
    }

    #[test]
    fn test_mixed_conditions() {
        let goal = Goal::new("rich", 1.0)
            .with_condition(Compare::new("gold", Comparison::GreaterOrEqual, 100.0));
        assert!(!goal.is_satisfied(&WorldState::new().with("gold", 99)));
        assert!(goal.is_satisfied(&WorldState::new().with("gold", 100)));
    }
}
