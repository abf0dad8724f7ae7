//! Runs a plan one action at a time

use tracing::debug;

use crate::action::ActionResult;
use crate::planner::{ActionId, ActionPlanner, Plan};

/// Result of one executor tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The current action is still running
    Running(ActionId),
    /// An action succeeded and the next one is queued
    Advanced(ActionId),
    /// Every action of the plan succeeded
    Completed,
    /// The current action reported failure; re-plan
    Failed(ActionId),
    /// The next action's preconditions no longer hold; re-plan
    Invalidated(ActionId),
}

/// Walks a plan, gating each action on its preconditions and applying its
/// consequences once it succeeds
#[derive(Debug, Clone)]
pub struct PlanExecutor {
    plan: Plan,
    step: usize,
}

impl PlanExecutor {
    pub fn new(plan: Plan) -> Self {
        Self { plan, step: 0 }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Index of the current step
    pub fn step(&self) -> usize {
        self.step
    }

    /// Action the next tick will run
    pub fn current(&self) -> Option<ActionId> {
        self.plan.steps.get(self.step).map(|s| s.action)
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.plan.len()
    }

    /// Run one tick of the current action against the planner's parameters
    pub fn tick(&mut self, planner: &mut ActionPlanner) -> ExecutionStatus {
        let Some(id) = self.current() else {
            return ExecutionStatus::Completed;
        };

        // A started action already passed the gate
        let started = planner.action(id).is_some_and(|a| a.is_started());
        if !started && !planner.is_ready(id) {
            debug!(
                "Action '{}' is no longer ready",
                planner.action_name(id).unwrap_or("?")
            );
            return ExecutionStatus::Invalidated(id);
        }

        match planner.execute(id) {
            Some(ActionResult::Running) => ExecutionStatus::Running(id),
            Some(ActionResult::Success) => {
                planner.apply_consequences(id);
                self.step += 1;
                match self.current() {
                    Some(next) => ExecutionStatus::Advanced(next),
                    None => ExecutionStatus::Completed,
                }
            }
            Some(ActionResult::Failure) | None => ExecutionStatus::Failed(id),
        }
    }

    /// Interrupt the current action, if it is running
    pub fn abort(&mut self, planner: &mut ActionPlanner) {
        if let Some(id) = self.current() {
            planner.abort(id);
        }
    }
}
