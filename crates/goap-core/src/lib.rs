//! GOAP Core - Shared types for goal oriented action planning
//!
//! This crate provides the foundational types used by the planner:
//! - Typed fact values
//! - World state snapshots the planner searches over
//! - Planner configuration
//! - Common error types

pub mod config;
pub mod error;
pub mod value;
pub mod world_state;

pub use config::{Heuristic, PlannerConfig};
pub use error::GoapError;
pub use value::Value;
pub use world_state::WorldState;
