//! GOAP action definitions and the per-action execution lifecycle

use std::fmt;

use goap_core::{Value, WorldState};

use crate::condition::{self, Condition, Equals};
use crate::consequence::{self, Consequence, Set};

/// Outcome of one execution tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    Running,
    Failure,
}

impl ActionResult {
    /// Success or Failure
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionResult::Running)
    }
}

/// What an action actually does while it runs.
///
/// `enter` runs once when the action starts, `execution` once per tick and
/// `exit` once when `execution` returns a terminal result (or the action is
/// aborted).
pub trait ActionBehavior: Send {
    /// Called once when the action is registered with a planner
    fn initialize(&mut self, _params: &WorldState) {}

    fn enter(&mut self, _params: &mut WorldState) {}

    fn execution(&mut self, params: &mut WorldState) -> ActionResult;

    fn exit(&mut self, _params: &mut WorldState) {}
}

/// Completes on the first tick
#[derive(Debug, Clone, Copy, Default)]
pub struct Instant;

impl ActionBehavior for Instant {
    fn execution(&mut self, _params: &mut WorldState) -> ActionResult {
        ActionResult::Success
    }
}

/// Runs for a fixed number of ticks, then succeeds
#[derive(Debug, Clone, Copy)]
pub struct Ticks {
    total: u32,
    elapsed: u32,
}

impl Ticks {
    /// `total` of zero behaves like one
    pub fn new(total: u32) -> Self {
        Self {
            total: total.max(1),
            elapsed: 0,
        }
    }
}

impl ActionBehavior for Ticks {
    fn enter(&mut self, _params: &mut WorldState) {
        self.elapsed = 0;
    }

    fn execution(&mut self, _params: &mut WorldState) -> ActionResult {
        self.elapsed += 1;
        if self.elapsed >= self.total {
            ActionResult::Success
        } else {
            ActionResult::Running
        }
    }
}

/// Edge weight of an action in the planner's search
pub enum Cost {
    Fixed(f32),
    Computed(Box<dyn Fn(&WorldState) -> f32 + Send + Sync>),
}

impl fmt::Debug for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Fixed(c) => write!(f, "Fixed({})", c),
            Cost::Computed(_) => f.write_str("Computed"),
        }
    }
}

/// Something an agent can do to change world state
pub struct Action {
    name: String,
    preconditions: Vec<Box<dyn Condition>>,
    consequences: Vec<Box<dyn Consequence>>,
    cost: Cost,
    behavior: Box<dyn ActionBehavior>,
    started: bool,
}

impl Action {
    /// New action with no preconditions, no consequences, cost 1 and an
    /// instant behavior
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preconditions: Vec::new(),
            consequences: Vec::new(),
            cost: Cost::Fixed(1.0),
            behavior: Box::new(Instant),
            started: false,
        }
    }

    pub fn with_precondition(mut self, condition: impl Condition + 'static) -> Self {
        self.preconditions.push(Box::new(condition));
        self
    }

    pub fn with_consequence(mut self, consequence: impl Consequence + 'static) -> Self {
        self.consequences.push(Box::new(consequence));
        self
    }

    /// Shorthand for an `Equals` precondition
    pub fn requires(self, key: &str, value: impl Into<Value>) -> Self {
        self.with_precondition(Equals::new(key, value))
    }

    /// Shorthand for a `Set` consequence
    pub fn sets(self, key: &str, value: impl Into<Value>) -> Self {
        self.with_consequence(Set::new(key, value))
    }

    /// Preconditions and consequences from fact sets
    pub fn with_states(mut self, preconditions: &WorldState, effects: &WorldState) -> Self {
        self.preconditions.extend(condition::from_state(preconditions));
        self.consequences.extend(consequence::from_state(effects));
        self
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = Cost::Fixed(cost);
        self
    }

    /// Cost computed from the parameters at the point the action would run
    pub fn with_cost_fn<F>(mut self, cost: F) -> Self
    where
        F: Fn(&WorldState) -> f32 + Send + Sync + 'static,
    {
        self.cost = Cost::Computed(Box::new(cost));
        self
    }

    pub fn with_behavior(mut self, behavior: impl ActionBehavior + 'static) -> Self {
        self.behavior = Box::new(behavior);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preconditions(&self) -> &[Box<dyn Condition>] {
        &self.preconditions
    }

    pub fn consequences(&self) -> &[Box<dyn Consequence>] {
        &self.consequences
    }

    pub fn cost(&self) -> &Cost {
        &self.cost
    }

    /// Whether the action is between `enter` and `exit`
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True if all preconditions hold. An action without preconditions is
    /// always ready.
    pub fn is_ready(&self, params: &WorldState) -> bool {
        self.preconditions.iter().all(|c| c.validate(params))
    }

    /// Estimated cost of running the action with the given parameters
    pub fn calculate_cost(&self, params: &WorldState) -> f32 {
        match &self.cost {
            Cost::Fixed(cost) => *cost,
            Cost::Computed(cost) => cost(params),
        }
    }

    pub fn apply_consequences(&self, params: &mut WorldState) {
        for consequence in &self.consequences {
            consequence.apply(params);
        }
    }

    /// State after applying the consequences to a copy of `params`
    pub fn simulate(&self, params: &WorldState) -> WorldState {
        let mut next = params.clone();
        self.apply_consequences(&mut next);
        next
    }

    /// Run one tick of the action.
    ///
    /// Preconditions are not checked here; callers gate on `is_ready`.
    /// Consequences are not applied here either.
    pub fn execute(&mut self, params: &mut WorldState) -> ActionResult {
        if !self.started {
            self.started = true;
            self.behavior.enter(params);
        }

        let result = self.behavior.execution(params);
        if result.is_terminal() {
            self.behavior.exit(params);
            self.started = false;
        }
        result
    }

    /// Stop a running action, calling `exit` if it had been entered
    pub fn abort(&mut self, params: &mut WorldState) {
        if self.started {
            self.behavior.exit(params);
            self.started = false;
        }
    }

    pub(crate) fn initialize(&mut self, params: &WorldState) {
        self.behavior.initialize(params);
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("preconditions", &self.preconditions)
            .field("consequences", &self.consequences)
            .field("cost", &self.cost)
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Predicate;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        enter: AtomicUsize,
        execution: AtomicUsize,
        exit: AtomicUsize,
    }

    struct Scripted {
        results: VecDeque<ActionResult>,
        counters: Arc<Counters>,
    }

    impl ActionBehavior for Scripted {
        fn enter(&mut self, _params: &mut WorldState) {
            self.counters.enter.fetch_add(1, Ordering::SeqCst);
        }

        fn execution(&mut self, _params: &mut WorldState) -> ActionResult {
            self.counters.execution.fetch_add(1, Ordering::SeqCst);
            self.results.pop_front().unwrap_or(ActionResult::Success)
        }

        fn exit(&mut self, _params: &mut WorldState) {
            self.counters.exit.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scripted(results: &[ActionResult]) -> (Action, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let action = Action::new("scripted").with_behavior(Scripted {
            results: results.iter().copied().collect(),
            counters: counters.clone(),
        });
        (action, counters)
    }

    fn counts(c: &Counters) -> (usize, usize, usize) {
        (
            c.enter.load(Ordering::SeqCst),
            c.execution.load(Ordering::SeqCst),
            c.exit.load(Ordering::SeqCst),
        )
    }

    #[test]
    fn test_is_ready_empty_preconditions() {
        let action = Action::new("idle");
        assert!(action.is_ready(&WorldState::new()));
    }

    #[test]
    fn test_is_ready_requires_all() {
        let action = Action::new("chop_wood")
            .requires("has_axe", true)
            .requires("near_tree", true);
        let ws = WorldState::new().with("has_axe", true).with("near_tree", false);
        assert!(!action.is_ready(&ws));

        let ws = ws.with("near_tree", true);
        assert!(action.is_ready(&ws));
    }

    #[test]
    fn test_is_ready_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let action = Action::new("gated")
            .requires("open", true)
            .with_precondition(Predicate::new("counted", move |_: &WorldState| {
                seen.fetch_add(1, Ordering::SeqCst);
                true
            }));
        assert!(!action.is_ready(&WorldState::from_bool("open", false)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fixed_and_computed_cost() {
        let fixed = Action::new("walk").with_cost(2.5);
        assert_eq!(fixed.calculate_cost(&WorldState::new()), 2.5);

        let computed = Action::new("walk_far").with_cost_fn(|ws: &WorldState| {
            ws.get_number("distance").unwrap_or(0.0) as f32 * 0.5
        });
        let ws = WorldState::new().with("distance", 8);
        assert_eq!(computed.calculate_cost(&ws), 4.0);
        assert_eq!(computed.calculate_cost(&ws), 4.0);
    }

    #[test]
    fn test_simulate_leaves_input_untouched() {
        let action = Action::new("chop_wood").sets("has_wood", true);
        let ws = WorldState::from_bool("has_wood", false);
        let next = action.simulate(&ws);
        assert_eq!(ws.get_bool("has_wood"), Some(false));
        assert_eq!(next.get_bool("has_wood"), Some(true));
    }

    #[test]
    fn test_instant_lifecycle() {
        let (mut action, counters) = scripted(&[ActionResult::Success]);
        let mut ws = WorldState::new();
        assert_eq!(action.execute(&mut ws), ActionResult::Success);
        assert_eq!(counts(&counters), (1, 1, 1));
        assert!(!action.is_started());
    }

    #[test]
    fn test_running_never_reenters() {
        use ActionResult::*;
        let (mut action, counters) = scripted(&[Running, Running, Running, Success]);
        let mut ws = WorldState::new();

        for _ in 0..3 {
            assert_eq!(action.execute(&mut ws), Running);
            assert!(action.is_started());
        }
        assert_eq!(counts(&counters), (1, 3, 0));

        assert_eq!(action.execute(&mut ws), Success);
        assert_eq!(counts(&counters), (1, 4, 1));
    }

    #[test]
    fn test_failure_exits_once_before_next_enter() {
        use ActionResult::*;
        let (mut action, counters) = scripted(&[Running, Failure, Running]);
        let mut ws = WorldState::new();

        assert_eq!(action.execute(&mut ws), Running);
        assert_eq!(action.execute(&mut ws), Failure);
        assert_eq!(counts(&counters), (1, 2, 1));

        assert_eq!(action.execute(&mut ws), Running);
        assert_eq!(counts(&counters), (2, 3, 1));
    }

    #[test]
    fn test_abort_only_exits_started_action() {
        use ActionResult::*;
        let (mut action, counters) = scripted(&[Running]);
        let mut ws = WorldState::new();

        action.abort(&mut ws);
        assert_eq!(counts(&counters), (0, 0, 0));

        action.execute(&mut ws);
        action.abort(&mut ws);
        assert_eq!(counts(&counters), (1, 1, 1));
        assert!(!action.is_started());
    }

    #[test]
    fn test_ticks_behavior() {
        let mut action = Action::new("saw").with_behavior(Ticks::new(3));
        let mut ws = WorldState::new();
        assert_eq!(action.execute(&mut ws), ActionResult::Running);
        assert_eq!(action.execute(&mut ws), ActionResult::Running);
        assert_eq!(action.execute(&mut ws), ActionResult::Success);
        // restarts from zero on the next enter
        assert_eq!(action.execute(&mut ws), ActionResult::Running);
    }

    #[test]
    fn test_execute_does_not_apply_consequences() {
        let mut action = Action::new("chop_wood").sets("has_wood", true);
        let mut ws = WorldState::new();
        assert_eq!(action.execute(&mut ws), ActionResult::Success);
        assert!(ws.is_empty());
    }
}
