//! World state representation for the passage planning engine.
//!
//! This module provides [`WorldState`], the atomic unit that the rest of the
//! engine compares, merges, and tests. A world state is a snapshot of narrative
//! facts, key/value pairs such as `door: "open"` or `score: 10`, used for:
//!
//! - The initial state of the story world (the start passage's preconditions)
//! - Goal states the planner tries to reach (the start passage's effects)
//! - Preconditions that must hold before a passage's action can fire
//! - Effects a passage asserts about the world after it fires
//!
//! Fact values are restricted to three primitive kinds ([`FactValue`]):
//! booleans, numbers, and strings. This matches what the authoring tool's JSON
//! editors can produce, and [`WorldState`] serializes transparently as a JSON
//! object for that reason.
//!
//! # Example
//!
//! ```
//! use passage_planner::WorldState;
//!
//! let mut world = WorldState::new();
//! world.set("lamp", "lit");
//! world.set("has_key", true);
//! world.set("score", 10.0);
//!
//! // A goal only names the facts it cares about; extra facts are ignored.
//! let mut goal = WorldState::new();
//! goal.set("has_key", true);
//! assert!(world.satisfies(&goal));
//!
//! // Applying effects produces a new state; the original is untouched.
//! let mut effects = WorldState::new();
//! effects.set("lamp", "out");
//! let next = world.apply(&effects);
//! assert_eq!(next.get("lamp"), Some(&"out".into()));
//! assert_eq!(world.get("lamp"), Some(&"lit".into()));
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single fact value: a boolean, a number, or a string.
///
/// Values of different kinds never compare equal, even when they look alike
/// (`FactValue::from("true")` is not `FactValue::from(true)`). Numbers are
/// compared and hashed through a canonical bit pattern so that `-0.0` equals
/// `0.0` and equality stays consistent with hashing.
///
/// Serialization is untagged: `true`, `3` and `"open"` in authored JSON all
/// deserialize to the kind you would expect.
///
/// # Examples
///
/// ```
/// use passage_planner::FactValue;
///
/// let lit: FactValue = true.into();
/// let score: FactValue = 10.0.into();
/// let door: FactValue = "open".into();
///
/// assert_ne!(lit, FactValue::from("true"));
/// assert_eq!(score, FactValue::from(10i64));
/// assert_eq!(door, serde_json::from_str::<FactValue>("\"open\"").unwrap());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// A boolean fact, e.g. `has_key: true`
    Bool(bool),
    /// A numeric fact, e.g. `score: 10`
    Number(f64),
    /// A string fact, e.g. `door: "open"`
    Text(String),
}

/// Canonical bit pattern for a number so `Eq` and `Hash` agree: `-0.0` maps
/// to `0.0`, and every NaN maps to the same pattern.
fn canonical_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for FactValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FactValue::Bool(a), FactValue::Bool(b)) => a == b,
            (FactValue::Number(a), FactValue::Number(b)) => {
                canonical_bits(*a) == canonical_bits(*b)
            }
            (FactValue::Text(a), FactValue::Text(b)) => a == b,
            // Mismatched kinds on the same key are permitted; they simply
            // never compare equal.
            _ => false,
        }
    }
}

impl Eq for FactValue {}

impl Hash for FactValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            FactValue::Bool(b) => {
                0u8.hash(state);
                b.hash(state);
            }
            FactValue::Number(n) => {
                1u8.hash(state);
                canonical_bits(*n).hash(state);
            }
            FactValue::Text(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Number(value)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        FactValue::Number(value as f64)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Bool(b) => write!(f, "{}", b),
            FactValue::Number(n) => write!(f, "{}", n),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// `WorldState` represents the state of the story world as a collection of
/// fact key/value pairs.
///
/// It is used both for the current state of the world and for partial states:
/// goals, preconditions, and effects. All operations are total; there is no
/// failure mode for well-formed fact mappings.
///
/// World states are immutable by convention inside the engine: preprocessing
/// and search only ever derive *new* states via [`WorldState::apply`]. They
/// are cheap to clone and usable as hash-map keys, which is what the planning
/// graph relies on to deduplicate nodes.
///
/// # Examples
///
/// ```
/// use passage_planner::WorldState;
///
/// let mut state = WorldState::new();
/// state.set("door", "open");
/// state.set("room", "lit");
///
/// let mut goal = WorldState::new();
/// goal.set("room", "lit");
///
/// // Partial matching: extra facts in `state` are ignored.
/// assert!(state.satisfies(&goal));
/// // Structural equality is stricter.
/// assert_ne!(state, goal);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldState {
    facts: HashMap<String, FactValue>,
}

impl WorldState {
    /// Creates a new empty world state.
    ///
    /// An empty state satisfies nothing except the empty requirement, and is
    /// trivially satisfied as a requirement by every state.
    pub fn new() -> Self {
        Self {
            facts: HashMap::new(),
        }
    }

    /// Sets a fact, overwriting any previous value for the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use passage_planner::WorldState;
    ///
    /// let mut state = WorldState::new();
    /// state.set("score", 5.0);
    /// state.set("score", 10.0);
    /// assert_eq!(state.get("score"), Some(&10.0.into()));
    /// ```
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FactValue>) {
        self.facts.insert(key.into(), value.into());
    }

    /// Gets the value of a fact, or `None` if the key is absent.
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.facts.get(key)
    }

    /// Returns the number of facts in this state.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` if this state holds no facts.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates over all fact key/value pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FactValue)> {
        self.facts.iter()
    }

    /// Checks whether this state satisfies the requirements in `required`.
    ///
    /// A state satisfies a required sub-state when every key in `required`
    /// exists here with an equal value. Extra facts in `self` are ignored:
    /// this is partial matching, not structural equality. An empty
    /// requirement is trivially satisfied by any state.
    ///
    /// This single predicate drives the whole engine: it is the
    /// applicability test for actions and the goal test for search.
    ///
    /// # Examples
    ///
    /// ```
    /// use passage_planner::WorldState;
    ///
    /// let mut world = WorldState::new();
    /// world.set("has_key", true);
    /// world.set("door", "locked");
    ///
    /// let mut required = WorldState::new();
    /// required.set("has_key", true);
    /// assert!(world.satisfies(&required));
    ///
    /// required.set("door", "open");
    /// assert!(!world.satisfies(&required));
    ///
    /// assert!(world.satisfies(&WorldState::new()));
    /// ```
    pub fn satisfies(&self, required: &WorldState) -> bool {
        required
            .facts
            .iter()
            .all(|(key, value)| self.facts.get(key) == Some(value))
    }

    /// Returns a new state equal to `self` with every fact in `effects`
    /// overwritten (a right-biased merge). Keys present only in `self` are
    /// retained; `self` is not mutated.
    ///
    /// Applying the same effects twice is idempotent:
    /// `s.apply(e).apply(e) == s.apply(e)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use passage_planner::WorldState;
    ///
    /// let mut state = WorldState::new();
    /// state.set("door", "locked");
    /// state.set("lamp", "lit");
    ///
    /// let mut effects = WorldState::new();
    /// effects.set("door", "open");
    ///
    /// let next = state.apply(&effects);
    /// assert_eq!(next.get("door"), Some(&"open".into()));
    /// assert_eq!(next.get("lamp"), Some(&"lit".into())); // retained
    /// assert_eq!(state.get("door"), Some(&"locked".into())); // unchanged
    /// ```
    pub fn apply(&self, effects: &WorldState) -> WorldState {
        let mut next = self.clone();
        for (key, value) in effects.facts.iter() {
            next.facts.insert(key.clone(), value.clone());
        }
        next
    }

    /// Parses a world state from a JSON object, as produced by the authoring
    /// tool's precondition/effect editors.
    ///
    /// # Examples
    ///
    /// ```
    /// use passage_planner::WorldState;
    ///
    /// let state = WorldState::from_json(r#"{"door": "open", "score": 10}"#).unwrap();
    /// assert_eq!(state.get("door"), Some(&"open".into()));
    /// assert_eq!(state.get("score"), Some(&10.0.into()));
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<HashMap<String, FactValue>> for WorldState {
    fn from(facts: HashMap<String, FactValue>) -> Self {
        Self { facts }
    }
}

impl FromIterator<(String, FactValue)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (String, FactValue)>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().collect(),
        }
    }
}

impl PartialEq for WorldState {
    /// Structural equality: same keys with the same values, independent of
    /// insertion order. Two planning-graph nodes with equal world states are
    /// the same node.
    fn eq(&self, other: &Self) -> bool {
        self.facts.len() == other.facts.len() && self.satisfies(other)
    }
}

impl Eq for WorldState {}

impl Hash for WorldState {
    /// Order-independent hashing: pairs are hashed in key-sorted order so
    /// that equal states hash equally regardless of insertion history.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut items: Vec<_> = self.facts.iter().collect();
        items.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in items {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for WorldState {
    /// Formats the state as `{key: value, ...}` with keys sorted for stable
    /// output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<_> = self.facts.iter().collect();
        items.sort_by(|a, b| a.0.cmp(b.0));

        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in items {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
            first = false;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(state: &WorldState) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_satisfies_partial_match() {
        let mut world = WorldState::new();
        world.set("a", true);
        world.set("b", "two");

        let mut required = WorldState::new();
        required.set("a", true);

        assert!(world.satisfies(&required));
        assert!(!required.satisfies(&world));
    }

    #[test]
    fn test_satisfies_empty_requirement() {
        let empty = WorldState::new();
        let mut world = WorldState::new();
        world.set("x", 1.0);

        assert!(world.satisfies(&empty));
        assert!(empty.satisfies(&empty));
    }

    #[test]
    fn test_satisfies_mismatched_value() {
        let mut world = WorldState::new();
        world.set("door", "open");

        let mut required = WorldState::new();
        required.set("door", "locked");
        assert!(!world.satisfies(&required));
    }

    #[test]
    fn test_mismatched_kinds_never_equal() {
        let mut world = WorldState::new();
        world.set("flag", "true");

        let mut required = WorldState::new();
        required.set("flag", true);
        assert!(!world.satisfies(&required));
    }

    #[test]
    fn test_apply_is_right_biased() {
        let mut base = WorldState::new();
        base.set("a", 1.0);
        base.set("b", 2.0);

        let mut effects = WorldState::new();
        effects.set("b", 20.0);
        effects.set("c", 3.0);

        let result = base.apply(&effects);
        assert_eq!(result.get("a"), Some(&1.0.into()));
        assert_eq!(result.get("b"), Some(&20.0.into()));
        assert_eq!(result.get("c"), Some(&3.0.into()));
        // original untouched
        assert_eq!(base.get("b"), Some(&2.0.into()));
        assert_eq!(base.get("c"), None);
    }

    #[test]
    fn test_apply_idempotent() {
        let mut base = WorldState::new();
        base.set("x", false);

        let mut effects = WorldState::new();
        effects.set("x", true);
        effects.set("y", "set");

        let once = base.apply(&effects);
        let twice = once.apply(&effects);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_equality_is_order_independent() {
        let mut a = WorldState::new();
        a.set("k1", "v1");
        a.set("k2", "v2");

        let mut b = WorldState::new();
        b.set("k2", "v2");
        b.set("k1", "v1");

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_subset_is_not_equal() {
        let mut a = WorldState::new();
        a.set("k1", "v1");
        a.set("k2", "v2");

        let mut b = WorldState::new();
        b.set("k1", "v1");

        assert_ne!(a, b);
    }

    #[test]
    fn test_negative_zero_number_equality() {
        let a = FactValue::from(0.0);
        let b = FactValue::from(-0.0);
        assert_eq!(a, b);

        let mut s1 = WorldState::new();
        s1.set("n", 0.0);
        let mut s2 = WorldState::new();
        s2.set("n", -0.0);
        assert_eq!(s1, s2);
        assert_eq!(hash_of(&s1), hash_of(&s2));
    }

    #[test]
    fn test_display_is_sorted() {
        let mut state = WorldState::new();
        state.set("b", 2.0);
        state.set("a", true);
        assert_eq!(state.to_string(), "{a: true, b: 2}");
    }

    #[test]
    fn test_json_round_trip() {
        let state = WorldState::from_json(r#"{"door": "open", "lit": true, "n": 3}"#).unwrap();
        assert_eq!(state.get("door"), Some(&"open".into()));
        assert_eq!(state.get("lit"), Some(&true.into()));
        assert_eq!(state.get("n"), Some(&3.0.into()));

        let json = serde_json::to_string(&state).unwrap();
        let back = WorldState::from_json(&json).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(WorldState::from_json("[1, 2, 3]").is_err());
    }
}
