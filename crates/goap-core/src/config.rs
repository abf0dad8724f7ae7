use serde::{Deserialize, Serialize};

/// Estimate used to order the planner's frontier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Heuristic {
    /// No estimate; the search is uniform-cost and always returns the cheapest plan.
    #[default]
    Uniform,
    /// Number of goal conditions not yet met, times `weight`.
    /// Not admissible in general: it can return a more expensive plan.
    /// A negative or non-finite weight estimates zero.
    UnsatisfiedConditions { weight: f32 },
}

/// Search limits and ordering for the action planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum nodes popped from the frontier before giving up.
    pub max_expanded_nodes: usize,
    /// Maximum number of actions in a plan.
    pub max_depth: usize,
    pub heuristic: Heuristic,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expanded_nodes: 2048,
            max_depth: 16,
            heuristic: Heuristic::Uniform,
        }
    }
}

impl PlannerConfig {
    /// Same limits with a different heuristic.
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Estimated remaining cost given how many goal conditions are unmet.
    pub fn estimate(&self, unsatisfied: usize) -> f32 {
        match self.heuristic {
            Heuristic::Uniform => 0.0,
            Heuristic::UnsatisfiedConditions { weight } if weight.is_finite() && weight > 0.0 => {
                unsatisfied as f32 * weight
            }
            Heuristic::UnsatisfiedConditions { .. } => 0.0,
        }
    }
}
