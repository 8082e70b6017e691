//! A Goal-Oriented Action Planning (GOAP) engine for interactive fiction.
//!
//! Each story passage is treated as an [`Action`] with preconditions and
//! effects over a shared [`WorldState`]; a [`PlanningGraph`] expands the
//! reachable state space once per query, and [`search`] (A*) finds the
//! lowest-cost ordered path of actions from the start state to a goal state.
//! [`search_all`] decomposes a composite goal into named sub-goals and plans
//! each one against the same graph.

mod action;
mod error;
mod graph;
mod planner;
mod search;
mod visualizer;
mod world_state;

pub use action::{Action, MIN_ACTION_COST};
pub use error::{PlanError, Result};
pub use graph::{Edge, GoalNode, NodeId, PlanningGraph};
pub use planner::{search_all, MultiGoalPlan, Planner, PlannerConfig};
pub use search::{search, Plan, PlanStep};
pub use visualizer::GraphVisualizer;
pub use world_state::{FactValue, WorldState};
