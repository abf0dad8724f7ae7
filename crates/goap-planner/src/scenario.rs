//! Data-driven agent definitions loaded from TOML

use std::fs;
use std::path::Path;

use goap_core::{GoapError, PlannerConfig, Value, WorldState};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::action::{Action, Ticks};
use crate::agent::Agent;
use crate::condition::{Absent, Compare, Comparison, Equals};
use crate::consequence::{Add, Remove, Set};
use crate::goal::Goal;
use crate::planner::ActionPlanner;

/// A precondition as written in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionDef {
    Equals { key: String, value: Value },
    Compare { key: String, op: Comparison, value: f64 },
    Absent { key: String },
}

/// A consequence as written in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsequenceDef {
    Set { key: String, value: Value },
    Add { key: String, amount: f64 },
    Remove { key: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    /// Ticks the action runs before succeeding
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    #[serde(default)]
    pub preconditions: Vec<ConditionDef>,
    #[serde(default)]
    pub consequences: Vec<ConsequenceDef>,
}

fn default_cost() -> f32 {
    1.0
}

fn default_ticks() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDef {
    pub name: String,
    #[serde(default)]
    pub priority: f32,
    /// Facts that must all hold
    #[serde(default)]
    pub desired: WorldState,
    /// Extra conditions on top of `desired`
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
}

/// Everything needed to build an [`Agent`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub parameters: WorldState,
    #[serde(default)]
    pub goals: Vec<GoalDef>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    /// Name of the action to run when no goal can be planned for
    #[serde(default)]
    pub fallback: Option<String>,
}

impl ConditionDef {
    fn attach_to_action(&self, action: Action) -> Action {
        match self.clone() {
            ConditionDef::Equals { key, value } => action.with_precondition(Equals::new(key, value)),
            ConditionDef::Compare { key, op, value } => {
                action.with_precondition(Compare::new(key, op, value))
            }
            ConditionDef::Absent { key } => action.with_precondition(Absent::new(key)),
        }
    }

    fn attach_to_goal(&self, goal: Goal) -> Goal {
        match self.clone() {
            ConditionDef::Equals { key, value } => goal.with_condition(Equals::new(key, value)),
            ConditionDef::Compare { key, op, value } => {
                goal.with_condition(Compare::new(key, op, value))
            }
            ConditionDef::Absent { key } => goal.with_condition(Absent::new(key)),
        }
    }
}

impl ConsequenceDef {
    fn attach(&self, action: Action) -> Action {
        match self.clone() {
            ConsequenceDef::Set { key, value } => action.with_consequence(Set::new(key, value)),
            ConsequenceDef::Add { key, amount } => action.with_consequence(Add::new(key, amount)),
            ConsequenceDef::Remove { key } => action.with_consequence(Remove::new(key)),
        }
    }
}

impl ActionDef {
    pub fn build(&self) -> Action {
        let mut action = Action::new(self.name.clone())
            .with_cost(self.cost)
            .with_behavior(Ticks::new(self.ticks));
        for condition in &self.preconditions {
            action = condition.attach_to_action(action);
        }
        for consequence in &self.consequences {
            action = consequence.attach(action);
        }
        action
    }
}

impl GoalDef {
    pub fn build(&self) -> Goal {
        let mut goal = Goal::from_state(self.name.clone(), &self.desired, self.priority);
        for condition in &self.conditions {
            goal = condition.attach_to_goal(goal);
        }
        goal
    }
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> Result<Self, GoapError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self, GoapError> {
        let text =
            fs::read_to_string(path).map_err(|e| GoapError::ScenarioRead(path.to_path_buf(), e))?;
        let scenario = Self::from_toml_str(&text)?;
        info!(
            "Loaded scenario from {:?}: {} actions, {} goals",
            path,
            scenario.actions.len(),
            scenario.goals.len()
        );
        Ok(scenario)
    }

    /// Register every action and goal with a fresh planner
    pub fn build_agent(&self, config: PlannerConfig) -> Result<Agent, GoapError> {
        let mut planner = ActionPlanner::with_config(self.parameters.clone(), config);
        for def in &self.actions {
            planner.register(def.build())?;
        }

        let fallback = match &self.fallback {
            Some(name) => Some(
                planner
                    .find(name)
                    .ok_or_else(|| GoapError::UnknownAction(name.clone()))?,
            ),
            None => None,
        };

        let mut agent = Agent::new(planner);
        for def in &self.goals {
            agent.add_goal(def.build());
        }
        agent.set_fallback(fallback);
        Ok(agent)
    }
}
