//! Per-agent decision loop: goal selection, planning and plan execution

use tracing::debug;

use crate::executor::{ExecutionStatus, PlanExecutor};
use crate::goal::Goal;
use crate::planner::{ActionId, ActionPlanner, Plan, PlanStep};

/// What happened during one agent update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    /// Nothing to run: no goal can be planned for and the fallback action
    /// is missing or not ready
    Idle,
    Running(ActionId),
    Advanced(ActionId),
    /// The current plan finished
    Completed,
    /// The current plan failed or went stale and a new one was adopted
    Replanned,
}

/// An agent's planner, goals and the plan it is currently executing
#[derive(Debug)]
pub struct Agent {
    planner: ActionPlanner,
    goals: Vec<Goal>,
    executor: Option<PlanExecutor>,
    current_goal: Option<usize>,
    fallback: Option<ActionId>,
}

impl Agent {
    pub fn new(planner: ActionPlanner) -> Self {
        Self {
            planner,
            goals: Vec::new(),
            executor: None,
            current_goal: None,
            fallback: None,
        }
    }

    pub fn add_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    /// Action to run when no goal can be planned for, e.g. "wander"
    pub fn set_fallback(&mut self, action: Option<ActionId>) {
        self.fallback = action;
    }

    pub fn planner(&self) -> &ActionPlanner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut ActionPlanner {
        &mut self.planner
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Goal the current plan pursues, if it is not the fallback
    pub fn current_goal(&self) -> Option<&Goal> {
        self.current_goal.and_then(|i| self.goals.get(i))
    }

    pub fn current_plan(&self) -> Option<&Plan> {
        self.executor.as_ref().map(PlanExecutor::plan)
    }

    /// Get the name of the currently executing action
    pub fn current_action_name(&self) -> Option<&str> {
        let id = self.executor.as_ref()?.current()?;
        self.planner.action_name(id)
    }

    /// Highest priority goal that is not yet satisfied
    pub fn select_goal(&self) -> Option<&Goal> {
        self.goals_by_priority()
            .into_iter()
            .map(|i| &self.goals[i])
            .find(|g| !g.is_satisfied(self.planner.parameters()))
    }

    /// Goal indices, highest priority first. Equal priorities keep
    /// registration order.
    fn goals_by_priority(&self) -> Vec<usize> {
        let mut sorted: Vec<usize> = (0..self.goals.len()).collect();
        sorted.sort_by(|a, b| self.goals[*b].priority.total_cmp(&self.goals[*a].priority));
        sorted
    }

    /// Drop the current plan and plan for the highest priority goal that
    /// can be reached. Falls back to the fallback action if none can.
    ///
    /// Returns whether a plan was adopted.
    pub fn replan(&mut self) -> bool {
        self.clear_plan();

        for goal_idx in self.goals_by_priority() {
            let goal = &self.goals[goal_idx];
            if goal.is_satisfied(self.planner.parameters()) {
                continue; // already satisfied
            }
            match self.planner.calculate(goal) {
                Ok(plan) => {
                    debug!(
                        "Adopted plan for '{}' ({} actions, cost {})",
                        goal.name,
                        plan.len(),
                        plan.cost
                    );
                    self.executor = Some(PlanExecutor::new(plan));
                    self.current_goal = Some(goal_idx);
                    return true;
                }
                Err(failure) => debug!("Cannot plan for '{}': {}", goal.name, failure),
            }
        }

        // No goal needs pursuing or none can be planned
        if let Some(id) = self.fallback {
            if let Some(action) = self.planner.action(id) {
                if action.is_ready(self.planner.parameters()) {
                    let cost = action.calculate_cost(self.planner.parameters());
                    debug!("Falling back to '{}'", action.name());
                    self.executor = Some(PlanExecutor::new(Plan {
                        steps: vec![PlanStep { action: id, cost }],
                        cost,
                    }));
                    return true;
                }
            }
        }
        false
    }

    /// One decision tick: plan if idle, then run the current action
    pub fn update(&mut self) -> AgentStatus {
        if self.executor.is_none() && !self.replan() {
            return AgentStatus::Idle;
        }
        let Some(executor) = self.executor.as_mut() else {
            return AgentStatus::Idle;
        };

        match executor.tick(&mut self.planner) {
            ExecutionStatus::Running(id) => AgentStatus::Running(id),
            ExecutionStatus::Advanced(id) => AgentStatus::Advanced(id),
            ExecutionStatus::Completed => {
                self.executor = None;
                self.current_goal = None;
                AgentStatus::Completed
            }
            ExecutionStatus::Failed(id) | ExecutionStatus::Invalidated(id) => {
                debug!(
                    "Action '{}' did not complete, replanning",
                    self.planner.action_name(id).unwrap_or("?")
                );
                if self.replan() {
                    AgentStatus::Replanned
                } else {
                    AgentStatus::Idle
                }
            }
        }
    }

    /// Abort the running action, if any, and forget the plan
    pub fn clear_plan(&mut self) {
        if let Some(mut executor) = self.executor.take() {
            executor.abort(&mut self.planner);
        }
        self.current_goal = None;
    }
}
