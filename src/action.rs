//! Actions for the passage planning engine.
//!
//! Every passage in a story doubles as an [`Action`]: a named transformation
//! of the world state with preconditions (facts that must hold before the
//! passage can fire), effects (facts asserted afterwards), and a cost. The
//! planner chains these transformations to find a path from the story's
//! start state to its goal state(s).
//!
//! # Example
//!
//! ```
//! use passage_planner::{Action, WorldState};
//!
//! let mut unlock = Action::new("Unlock the door", 1.0).unwrap();
//! unlock.preconditions.set("has_key", true);
//! unlock.effects.set("door", "open");
//!
//! let mut world = WorldState::new();
//! world.set("has_key", true);
//!
//! assert!(unlock.is_applicable(&world));
//! let next = unlock.apply(&world);
//! assert_eq!(next.get("door"), Some(&"open".into()));
//! ```

use crate::{PlanError, Result, WorldState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An action in the planning engine, corresponding to one authored passage.
///
/// An action has:
/// - A name, unique within a planning query (the passage name)
/// - Preconditions that must be satisfied for the action to be applicable
/// - Effects applied to the world state when the action fires
/// - A cost of at least 1
///
/// The cost floor is deliberate: the authoring tool lets writers type any
/// number, and a zero or negative cost is quietly treated as 1 rather than
/// rejected. This keeps every search step strictly positive, which both
/// guarantees termination and keeps the unsatisfied-goal-count heuristic
/// admissible. Only non-finite costs (NaN, infinity) are construction errors.
///
/// # Examples
///
/// ```
/// use passage_planner::Action;
///
/// let action = Action::new("Cross the bridge", 2.5).unwrap();
/// assert_eq!(action.name, "Cross the bridge");
/// assert_eq!(action.cost(), 2.5);
///
/// // Authored costs below 1 are floored, not rejected.
/// let cheap = Action::new("Blink", 0.0).unwrap();
/// assert_eq!(cheap.cost(), 1.0);
///
/// // Non-finite costs are rejected outright.
/// assert!(Action::new("Broken", f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    /// The name of the action; unique within a planning query
    pub name: String,
    /// The cost of the action, clamped to a minimum of 1
    cost: f64,
    /// Facts that must hold in a state for this action to be applicable
    pub preconditions: WorldState,
    /// Facts asserted about the world after this action fires
    pub effects: WorldState,
}

/// The minimum cost any action can have. Authored costs below this are
/// clamped at construction.
pub const MIN_ACTION_COST: f64 = 1.0;

impl Action {
    /// Creates a new action with the given name and cost, and empty
    /// preconditions and effects. Preconditions and effects are public
    /// fields and are filled in afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidActionCost`] if `cost` is NaN or
    /// infinite. Costs below 1 (including zero and negative values) are
    /// clamped to 1 instead of rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use passage_planner::Action;
    ///
    /// let mut action = Action::new("Light the lamp", 1.0).unwrap();
    /// action.effects.set("room", "lit");
    ///
    /// let clamped = Action::new("Freebie", -3.0).unwrap();
    /// assert_eq!(clamped.cost(), 1.0);
    /// ```
    pub fn new(name: impl Into<String>, cost: f64) -> Result<Self> {
        let name = name.into();
        if !cost.is_finite() {
            return Err(PlanError::InvalidActionCost(name));
        }

        Ok(Self {
            name,
            cost: cost.max(MIN_ACTION_COST),
            preconditions: WorldState::new(),
            effects: WorldState::new(),
        })
    }

    /// The cost of this action, always finite and at least 1.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Checks whether this action can fire in the given state, i.e. whether
    /// the state satisfies every precondition. An action with empty
    /// preconditions is always applicable.
    pub fn is_applicable(&self, state: &WorldState) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// Returns the state produced by firing this action in `state`: the
    /// action's effects merged over the state, leaving `state` untouched.
    pub fn apply(&self, state: &WorldState) -> WorldState {
        state.apply(&self.effects)
    }

    /// Parses an action from JSON, as stored on an authored passage. The
    /// same cost rules as [`Action::new`] apply; a missing cost defaults
    /// to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use passage_planner::Action;
    ///
    /// let action = Action::from_json(
    ///     r#"{"name": "Open the door", "cost": 0, "effects": {"door": "open"}}"#,
    /// ).unwrap();
    /// assert_eq!(action.name, "Open the door");
    /// assert_eq!(action.cost(), 1.0); // clamped
    /// assert!(action.preconditions.is_empty());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cost {})", self.name, self.cost)
    }
}

impl<'de> Deserialize<'de> for Action {
    /// Deserializes an action through the same validation and clamping as
    /// [`Action::new`], so stored passages can never smuggle in an invalid
    /// cost.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            #[serde(default = "default_cost")]
            cost: f64,
            #[serde(default)]
            preconditions: WorldState,
            #[serde(default)]
            effects: WorldState,
        }

        fn default_cost() -> f64 {
            MIN_ACTION_COST
        }

        let raw = Raw::deserialize(deserializer)?;
        if !raw.cost.is_finite() {
            return Err(serde::de::Error::custom(format!(
                "action `{}` must have a finite cost",
                raw.name
            )));
        }

        Ok(Action {
            name: raw.name,
            cost: raw.cost.max(MIN_ACTION_COST),
            preconditions: raw.preconditions,
            effects: raw.effects,
        })
    }
}
