//! Best-first GOAP planner — searches action space for the cheapest plan that reaches a goal

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use goap_core::{GoapError, PlannerConfig, WorldState};
use tracing::{debug, trace, warn};

use crate::action::{Action, ActionResult, Cost};
use crate::goal::Goal;

/// Cost reported by [`ActionPlanner::calculate_into`] when no plan exists
pub const FAILURE_COST: f32 = -1.0;

/// Handle to an action registered with a planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub usize);

/// One action of a plan with the cost it was planned at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanStep {
    pub action: ActionId,
    pub cost: f32,
}

/// Ordered actions that take the start state to a goal state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    /// Sum of the step costs
    pub cost: f32,
}

impl Plan {
    pub fn actions(&self) -> Vec<ActionId> {
        self.steps.iter().map(|s| s.action).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Why no plan was produced. Both cases are normal outcomes, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlanFailure {
    #[error("goal is unreachable (expanded {expanded} nodes)")]
    Unreachable { expanded: usize },

    #[error("search budget exhausted after expanding {expanded} nodes")]
    BudgetExhausted { expanded: usize },
}

/// A node in the search arena
#[derive(Debug)]
struct SearchNode {
    /// World state after applying actions so far
    state: WorldState,
    parent: Option<usize>,
    /// Action taken from the parent, with its cost
    step: Option<PlanStep>,
    /// Actual cost so far (g)
    cost: f32,
    depth: usize,
}

/// Frontier entry, ordered by estimated total then discovery order
#[derive(Debug)]
struct Candidate {
    /// Estimated total cost (f = g + h)
    estimated_total: f32,
    seq: u64,
    node: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is a max-heap); on equal
        // estimates the earlier discovery wins
        other
            .estimated_total
            .total_cmp(&self.estimated_total)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Whether some label is no more expensive and no deeper than `(cost, depth)`
fn dominated(labels: &[(f32, usize)], cost: f32, depth: usize) -> bool {
    labels.iter().any(|&(c, d)| c <= cost && d <= depth)
}

/// Record a label, dropping the ones it dominates
fn add_label(labels: &mut Vec<(f32, usize)>, cost: f32, depth: usize) {
    labels.retain(|&(c, d)| !(cost <= c && depth <= d));
    labels.push((cost, depth));
}

/// Owns the actions of one agent and the parameters they read and write
#[derive(Debug, Default)]
pub struct ActionPlanner {
    parameters: WorldState,
    actions: Vec<Action>,
    config: PlannerConfig,
}

impl ActionPlanner {
    pub fn new(parameters: WorldState) -> Self {
        Self::with_config(parameters, PlannerConfig::default())
    }

    pub fn with_config(parameters: WorldState, config: PlannerConfig) -> Self {
        Self {
            parameters,
            actions: Vec::new(),
            config,
        }
    }

    pub fn parameters(&self) -> &WorldState {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut WorldState {
        &mut self.parameters
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PlannerConfig) {
        self.config = config;
    }

    /// Add an action. Names must be unique and fixed costs finite and
    /// non-negative.
    pub fn register(&mut self, mut action: Action) -> Result<ActionId, GoapError> {
        if action.name().is_empty() {
            return Err(GoapError::EmptyActionName);
        }
        if self.find(action.name()).is_some() {
            return Err(GoapError::DuplicateAction(action.name().to_string()));
        }
        if let Cost::Fixed(cost) = action.cost() {
            if !cost.is_finite() || *cost < 0.0 {
                return Err(GoapError::InvalidCost {
                    name: action.name().to_string(),
                    cost: *cost,
                });
            }
        }

        action.initialize(&self.parameters);
        let id = ActionId(self.actions.len());
        debug!("Registered action '{}' as {:?}", action.name(), id);
        self.actions.push(action);
        Ok(id)
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    pub fn action_name(&self, id: ActionId) -> Option<&str> {
        self.action(id).map(Action::name)
    }

    /// Look up an action by name
    pub fn find(&self, name: &str) -> Option<ActionId> {
        self.actions.iter().position(|a| a.name() == name).map(ActionId)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Whether the action's preconditions hold against the current parameters
    pub fn is_ready(&self, id: ActionId) -> bool {
        self.action(id)
            .is_some_and(|action| action.is_ready(&self.parameters))
    }

    /// Run one tick of an action against the current parameters
    pub fn execute(&mut self, id: ActionId) -> Option<ActionResult> {
        let Self {
            parameters,
            actions,
            ..
        } = self;
        actions.get_mut(id.0).map(|action| action.execute(parameters))
    }

    /// Interrupt an action, calling its exit hook if it is running
    pub fn abort(&mut self, id: ActionId) {
        let Self {
            parameters,
            actions,
            ..
        } = self;
        if let Some(action) = actions.get_mut(id.0) {
            action.abort(parameters);
        }
    }

    pub fn apply_consequences(&mut self, id: ActionId) {
        if let Some(action) = self.actions.get(id.0) {
            action.apply_consequences(&mut self.parameters);
        }
    }

    /// Replay `plan` from `start`, checking every precondition on the way.
    /// Returns the final state, or None if a step is not ready or unknown.
    pub fn simulate(&self, start: &WorldState, plan: &Plan) -> Option<WorldState> {
        let mut state = start.clone();
        for step in &plan.steps {
            let action = self.action(step.action)?;
            if !action.is_ready(&state) {
                return None;
            }
            action.apply_consequences(&mut state);
        }
        Some(state)
    }

    /// Plan from the current parameters
    pub fn calculate(&self, goal: &Goal) -> Result<Plan, PlanFailure> {
        self.calculate_from(&self.parameters, goal)
    }

    /// Plan from the current parameters, writing the actions into `actions`.
    ///
    /// Returns the total cost, or [`FAILURE_COST`] with `actions` left empty.
    pub fn calculate_into(&self, goal: &Goal, actions: &mut Vec<ActionId>) -> f32 {
        actions.clear();
        match self.calculate(goal) {
            Ok(plan) => {
                actions.extend(plan.steps.iter().map(|s| s.action));
                plan.cost
            }
            Err(_) => FAILURE_COST,
        }
    }

    /// Find the cheapest sequence of actions that transforms `start` into a
    /// state satisfying `goal`.
    pub fn calculate_from(&self, start: &WorldState, goal: &Goal) -> Result<Plan, PlanFailure> {
        if goal.is_satisfied(start) {
            return Ok(Plan::default()); // already satisfied
        }

        let mut nodes = vec![SearchNode {
            state: start.clone(),
            parent: None,
            step: None,
            cost: 0.0,
            depth: 0,
        }];
        // (cost, depth) labels per state; a path is only kept if no label
        // is at least as cheap and at least as short
        let mut known: HashMap<WorldState, Vec<(f32, usize)>> = HashMap::new();
        known.insert(start.clone(), vec![(0.0, 0)]);
        let mut expanded_labels: HashMap<WorldState, Vec<(f32, usize)>> = HashMap::new();

        let mut open = BinaryHeap::new();
        open.push(Candidate {
            estimated_total: self.config.estimate(goal.unsatisfied_count(start)),
            seq: 0,
            node: 0,
        });
        let mut next_seq = 1;

        let mut expanded = 0;
        let mut depth_pruned = false;

        while let Some(candidate) = open.pop() {
            let node_idx = candidate.node;
            let node = &nodes[node_idx];
            if expanded_labels
                .get(&node.state)
                .is_some_and(|labels| dominated(labels, node.cost, node.depth))
            {
                continue; // expanded earlier at lower or equal cost and depth
            }

            // Check if goal reached
            if goal.is_satisfied(&nodes[node_idx].state) {
                let plan = Self::reconstruct(&nodes, node_idx);
                debug!(
                    "Planned '{}': {} actions, cost {}, expanded {} nodes",
                    goal.name,
                    plan.len(),
                    plan.cost,
                    expanded
                );
                return Ok(plan);
            }

            if expanded >= self.config.max_expanded_nodes {
                debug!(
                    "Planning '{}' stopped after expanding {} nodes",
                    goal.name, expanded
                );
                return Err(PlanFailure::BudgetExhausted { expanded });
            }
            expanded += 1;

            let state = nodes[node_idx].state.clone();
            let base_cost = nodes[node_idx].cost;
            let depth = nodes[node_idx].depth;
            add_label(
                expanded_labels.entry(state.clone()).or_default(),
                base_cost,
                depth,
            );
            trace!("Expanding {} at cost {}", state, base_cost);

            // Limit plan length
            if depth >= self.config.max_depth {
                depth_pruned = true;
                continue;
            }

            // Try each action in registration order
            for (i, action) in self.actions.iter().enumerate() {
                if !action.is_ready(&state) {
                    continue;
                }

                let step_cost = action.calculate_cost(&state);
                if !step_cost.is_finite() || step_cost < 0.0 {
                    warn!(
                        "Skipping action '{}': invalid cost {} in state {}",
                        action.name(),
                        step_cost,
                        state
                    );
                    continue;
                }

                let next_state = action.simulate(&state);
                let new_cost = base_cost + step_cost;
                let labels = known.entry(next_state.clone()).or_default();
                if dominated(labels, new_cost, depth + 1) {
                    continue;
                }
                add_label(labels, new_cost, depth + 1);

                let h = self.config.estimate(goal.unsatisfied_count(&next_state));
                nodes.push(SearchNode {
                    state: next_state,
                    parent: Some(node_idx),
                    step: Some(PlanStep {
                        action: ActionId(i),
                        cost: step_cost,
                    }),
                    cost: new_cost,
                    depth: depth + 1,
                });
                open.push(Candidate {
                    estimated_total: new_cost + h,
                    seq: next_seq,
                    node: nodes.len() - 1,
                });
                next_seq += 1;
            }
        }

        if depth_pruned {
            debug!(
                "Planning '{}' hit the depth limit of {}",
                goal.name, self.config.max_depth
            );
            Err(PlanFailure::BudgetExhausted { expanded })
        } else {
            debug!("No plan for '{}' after expanding {} nodes", goal.name, expanded);
            Err(PlanFailure::Unreachable { expanded })
        }
    }

    fn reconstruct(nodes: &[SearchNode], goal_idx: usize) -> Plan {
        let mut steps = Vec::new();
        let mut current = Some(goal_idx);
        while let Some(idx) = current {
            let node = &nodes[idx];
            if let Some(step) = node.step {
                steps.push(step);
            }
            current = node.parent;
        }
        steps.reverse();

        Plan {
            steps,
            cost: nodes[goal_idx].cost,
        }
    }
}
