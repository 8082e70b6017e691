use thiserror::Error;

/// Error types for the passage planning engine.
///
/// Note that an unreachable goal is *not* an error: unreachability is an
/// expected outcome of a search and is always represented as data (an absent
/// plan, or membership in a multi-goal result's unreached set), so UI callers
/// can render "no path" without exception handling.
///
/// # Examples
///
/// ```
/// use passage_planner::PlanError;
/// use std::error::Error;
///
/// let error = PlanError::GraphExplosion { limit: 10_000 };
/// assert_eq!(
///     format!("{}", error),
///     "planning graph exceeded the maximum of 10000 nodes"
/// );
///
/// // Errors can be converted to std::error::Error trait objects
/// let boxed: Box<dyn Error> = Box::new(error);
/// ```
#[derive(Error, Debug)]
pub enum PlanError {
    /// Error when an action is created with a non-finite cost (NaN or
    /// infinity). Costs below 1 are clamped instead of rejected.
    #[error("action `{0}` must have a finite cost")]
    InvalidActionCost(String),

    /// Error when two actions in the same planning query share a name
    #[error("duplicate action name `{0}` in planning query")]
    DuplicateAction(String),

    /// Error when forward expansion would create more nodes than the
    /// configured limit allows. No partial graph is returned.
    #[error("planning graph exceeded the maximum of {limit} nodes")]
    GraphExplosion {
        /// The node limit that was exceeded
        limit: usize,
    },

    /// A wrapper around standard IO errors (graph visualization output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A wrapper around serde_json serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;
