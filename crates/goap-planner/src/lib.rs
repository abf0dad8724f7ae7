//! GOAP Planner - Goal oriented action planning for game AI
//!
//! Provides the action/condition/consequence model, the cost-minimizing
//! planner, and the per-agent loop that executes plans tick by tick.

pub mod action;
pub mod agent;
pub mod condition;
pub mod consequence;
pub mod executor;
pub mod goal;
pub mod planner;
pub mod scenario;

pub use action::{Action, ActionBehavior, ActionResult, Cost, Instant, Ticks};
pub use agent::{Agent, AgentStatus};
pub use condition::{Comparison, Condition};
pub use consequence::Consequence;
pub use executor::{ExecutionStatus, PlanExecutor};
pub use goal::Goal;
pub use planner::{ActionId, ActionPlanner, Plan, PlanFailure, PlanStep, FAILURE_COST};
pub use scenario::Scenario;

pub use goap_core::{GoapError, Heuristic, PlannerConfig, Value, WorldState};
