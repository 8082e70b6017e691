//! Planner facade and multi-goal decomposition.
//!
//! A [`Planner`] bundles one query's action set and configuration, and turns
//! each `plan`/`plan_all` call into the two pure stages of the engine:
//! preprocessing ([`PlanningGraph::preprocess_with_limit`]) followed by
//! [`search`]. Every call builds a fresh graph; there is no planner state
//! shared across queries, so concurrent queries are free to run in parallel.
//!
//! The multi-goal path exists because a story's goal is often composite:
//! several named endings, each a partial world state of its own. Rather than
//! rebuilding the graph per ending, [`search_all`] runs one search per label
//! against the same preprocessed graph and reports which endings were
//! reached and which were not.
//!
//! # Example
//!
//! ```
//! use passage_planner::{Action, Planner, WorldState};
//!
//! let mut open = Action::new("Open the door", 1.0).unwrap();
//! open.effects.set("door", "open");
//!
//! let mut enter = Action::new("Enter the vault", 1.0).unwrap();
//! enter.preconditions.set("door", "open");
//! enter.effects.set("inside", true);
//!
//! let planner = Planner::new(vec![open, enter]).unwrap();
//!
//! let mut goal = WorldState::new();
//! goal.set("inside", true);
//!
//! let plan = planner
//!     .plan(&WorldState::new(), &goal)
//!     .unwrap()
//!     .expect("the vault is reachable");
//! assert_eq!(plan.action_names(), ["Open the door", "Enter the vault"]);
//! assert_eq!(plan.cost(), 2.0);
//! ```

use crate::search::{search, Plan};
use crate::{Action, PlanError, PlanningGraph, Result, WorldState};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Configuration for one planning query.
///
/// The engine itself never blocks and offers no timeout; the node cap is its
/// one latency guard, aborting preprocessing on action sets whose effects
/// would otherwise expand without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Maximum number of planning-graph nodes to create before failing with
    /// [`PlanError::GraphExplosion`]
    pub max_nodes: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_nodes: PlanningGraph::DEFAULT_MAX_NODES,
        }
    }
}

/// The result of a multi-goal search: per-label plans for the endings that
/// were reached, the set of labels that were not, and the "current"
/// representative label.
///
/// The representative is the *last successfully reached label in iteration
/// order*. That mirrors how the authoring tool picks the plan it displays by
/// default; it is a documented policy, and callers who want a different
/// representative can simply ignore it and pick from [`reached`].
///
/// [`reached`]: MultiGoalPlan::reached
#[derive(Debug, Clone, Default)]
pub struct MultiGoalPlan {
    reached: HashMap<String, Plan>,
    unreached: HashSet<String>,
    current: Option<String>,
}

impl MultiGoalPlan {
    /// The plans found, keyed by goal label.
    pub fn reached(&self) -> &HashMap<String, Plan> {
        &self.reached
    }

    /// The labels whose goals no reachable state satisfies. Unreachability
    /// of one label never affects the others.
    pub fn unreached(&self) -> &HashSet<String> {
        &self.unreached
    }

    /// The plan for a specific label, if its goal was reached.
    pub fn plan_for(&self, label: &str) -> Option<&Plan> {
        self.reached.get(label)
    }

    /// The label of the representative plan: the last successfully reached
    /// label in iteration order, if any goal was reached at all.
    pub fn current_label(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The representative plan itself.
    pub fn current_plan(&self) -> Option<&Plan> {
        self.current.as_deref().and_then(|l| self.reached.get(l))
    }
}

/// Runs one search per named goal against a single preprocessed graph.
///
/// Labels are processed independently and in slice order; a label lands in
/// the unreached set exactly when no reachable node satisfies its goal. A
/// label whose goal the start state already satisfies counts as reached,
/// with an empty plan.
///
/// # Examples
///
/// ```
/// use passage_planner::{search_all, Action, PlanningGraph, WorldState};
///
/// let mut win = Action::new("Slay the dragon", 1.0).unwrap();
/// win.effects.set("dragon", "slain");
///
/// let graph = PlanningGraph::preprocess(vec![win], WorldState::new()).unwrap();
///
/// let mut victory = WorldState::new();
/// victory.set("dragon", "slain");
/// let mut defeat = WorldState::new();
/// defeat.set("hero", "eaten");
///
/// let result = search_all(
///     &graph,
///     &[("victory".to_string(), victory), ("defeat".to_string(), defeat)],
/// );
/// assert!(result.plan_for("victory").is_some());
/// assert!(result.unreached().contains("defeat"));
/// assert_eq!(result.current_label(), Some("victory"));
/// ```
pub fn search_all(graph: &PlanningGraph, goals: &[(String, WorldState)]) -> MultiGoalPlan {
    let mut result = MultiGoalPlan::default();

    for (label, goal) in goals {
        match search(graph, goal) {
            Some(plan) => {
                debug!("goal `{}` reached in {} steps", label, plan.len());
                result.current = Some(label.clone());
                result.reached.insert(label.clone(), plan);
            }
            None => {
                debug!("goal `{}` unreachable", label);
                result.unreached.insert(label.clone());
            }
        }
    }

    result
}

/// The planning facade for one query: an action set plus configuration.
///
/// A `Planner` is built fresh per recomputation (e.g. whenever the authored
/// passage graph changes) and holds no mutable state; `plan` and `plan_all`
/// are pure functions of the planner and their arguments.
///
/// # Examples
///
/// ```
/// use passage_planner::{Action, PlanError, Planner};
///
/// // Action names must be unique within a query.
/// let a = Action::new("Look around", 1.0).unwrap();
/// let b = Action::new("Look around", 1.0).unwrap();
/// assert!(matches!(
///     Planner::new(vec![a, b]),
///     Err(PlanError::DuplicateAction(_))
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Planner {
    actions: Vec<Action>,
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner over the given actions with the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DuplicateAction`] if two actions share a name.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        Self::with_config(actions, PlannerConfig::default())
    }

    /// Creates a planner with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DuplicateAction`] if two actions share a name.
    pub fn with_config(actions: Vec<Action>, config: PlannerConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        for action in &actions {
            if !seen.insert(action.name.as_str()) {
                return Err(PlanError::DuplicateAction(action.name.clone()));
            }
        }

        Ok(Self { actions, config })
    }

    /// The planner's action set, in query order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Plans a path from `start` to the first state satisfying `goal`.
    ///
    /// Returns `Ok(None)` when the goal is unreachable (an expected
    /// outcome, not an error) and `Ok(Some(Plan::empty()))` when `start`
    /// already satisfies `goal`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::GraphExplosion`] if preprocessing exceeds the
    /// configured node limit.
    pub fn plan(&self, start: &WorldState, goal: &WorldState) -> Result<Option<Plan>> {
        let graph = self.preprocess(start)?;
        Ok(search(&graph, goal))
    }

    /// Plans paths for several named goals, preprocessing the graph once and
    /// searching it once per label.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::GraphExplosion`] if preprocessing exceeds the
    /// configured node limit. Unreachable labels are reported through the
    /// result's unreached set, never as errors.
    pub fn plan_all(
        &self,
        start: &WorldState,
        goals: &[(String, WorldState)],
    ) -> Result<MultiGoalPlan> {
        let graph = self.preprocess(start)?;
        Ok(search_all(&graph, goals))
    }

    /// Builds this query's planning graph from `start`. Exposed so callers
    /// that want both the graph and custom searches over it (or a DOT dump)
    /// can reuse a single preprocessing pass.
    pub fn preprocess(&self, start: &WorldState) -> Result<PlanningGraph> {
        PlanningGraph::preprocess_with_limit(
            self.actions.clone(),
            start.clone(),
            self.config.max_nodes,
        )
    }
}
