//! Planning graph construction (preprocessing).
//!
//! Before any search runs, the action set and a start state are expanded into
//! a [`PlanningGraph`]: the directed graph of every world state reachable by
//! chaining applicable actions, with one node per *distinct* state. Building
//! the graph without knowing the goal lets the same graph serve several goal
//! searches within one query; the multi-goal decomposition relies on this.
//!
//! Nodes are deduplicated through an explicit state-keyed index rather than
//! by identity, so convergent paths and cycles collapse into a single node.
//! That bound is what keeps expansion finite when actions can re-derive an
//! already-seen state.

use crate::{Action, PlanError, Result, WorldState};
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};

/// Index of a node within a [`PlanningGraph`]'s arena.
pub type NodeId = usize;

/// A directed edge in the planning graph: firing `action` in the source node
/// produces the state at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Index of the action (into the graph's action set) that this edge fires
    pub action: usize,
    /// The successor node produced by applying the action's effects
    pub to: NodeId,
}

/// A node in the planning graph: a reachable world state plus its outgoing
/// action edges.
///
/// Node identity is state equality: two nodes with equal world states are
/// the same graph node. Nodes are created lazily during preprocessing and
/// owned exclusively by the graph for the lifetime of one query.
#[derive(Debug, Clone)]
pub struct GoalNode {
    state: WorldState,
    edges: Vec<Edge>,
}

impl GoalNode {
    /// The world state this node represents.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// The outgoing edges of this node, in action-set order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// The preprocessed state-space graph for one planning query.
///
/// A `PlanningGraph` owns the query's action set and the arena of reachable
/// nodes. It is built once per query by [`PlanningGraph::preprocess`] and is
/// read-only afterwards; it is discarded and rebuilt on the next query, never
/// cached across queries.
///
/// # Examples
///
/// ```
/// use passage_planner::{Action, PlanningGraph, WorldState};
///
/// let mut open = Action::new("Open the door", 1.0).unwrap();
/// open.effects.set("door", "open");
///
/// let mut enter = Action::new("Step inside", 1.0).unwrap();
/// enter.preconditions.set("door", "open");
/// enter.effects.set("inside", true);
///
/// let graph = PlanningGraph::preprocess(vec![open, enter], WorldState::new()).unwrap();
/// // start, {door: open}, {door: open, inside: true}
/// assert_eq!(graph.node_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PlanningGraph {
    actions: Vec<Action>,
    nodes: Vec<GoalNode>,
    index: HashMap<WorldState, NodeId>,
    start: NodeId,
}

impl PlanningGraph {
    /// Default cap on the number of nodes preprocessing may create before
    /// failing with [`PlanError::GraphExplosion`].
    pub const DEFAULT_MAX_NODES: usize = 10_000;

    /// Builds the planning graph by forward expansion from `start`, with the
    /// default node limit.
    ///
    /// Always succeeds for bounded action sets; if no action is ever
    /// applicable the graph contains only the start node. See
    /// [`PlanningGraph::preprocess_with_limit`] for the failure mode.
    pub fn preprocess(actions: Vec<Action>, start: WorldState) -> Result<Self> {
        Self::preprocess_with_limit(actions, start, Self::DEFAULT_MAX_NODES)
    }

    /// Builds the planning graph by forward expansion from `start`, creating
    /// at most `max_nodes` nodes.
    ///
    /// Expansion works a FIFO frontier: for each dequeued node and each
    /// applicable action, the successor state is computed and either matched
    /// to an existing node through the state index or appended to the arena
    /// and enqueued. Termination is guaranteed because the set of distinct
    /// reachable states is bounded by the action set's effect combinations.
    /// The node cap guards against action sets that defeat that bound.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::GraphExplosion`] if a new node would push the
    /// arena past `max_nodes`. No partial graph is returned.
    pub fn preprocess_with_limit(
        actions: Vec<Action>,
        start: WorldState,
        max_nodes: usize,
    ) -> Result<Self> {
        let mut nodes = vec![GoalNode {
            state: start.clone(),
            edges: Vec::new(),
        }];
        let mut index = HashMap::new();
        index.insert(start, 0);

        let mut frontier = VecDeque::new();
        frontier.push_back(0);

        while let Some(id) = frontier.pop_front() {
            let state = nodes[id].state.clone();
            trace!("expanding node {}: {}", id, state);

            for (action_idx, action) in actions.iter().enumerate() {
                if !action.is_applicable(&state) {
                    continue;
                }

                let next = action.apply(&state);
                let to = match index.get(&next) {
                    Some(&existing) => existing,
                    None => {
                        if nodes.len() >= max_nodes {
                            debug!("aborting preprocessing at {} nodes", nodes.len());
                            return Err(PlanError::GraphExplosion { limit: max_nodes });
                        }
                        let new_id = nodes.len();
                        nodes.push(GoalNode {
                            state: next.clone(),
                            edges: Vec::new(),
                        });
                        index.insert(next, new_id);
                        frontier.push_back(new_id);
                        new_id
                    }
                };

                nodes[id].edges.push(Edge {
                    action: action_idx,
                    to,
                });
            }
        }

        let edge_count: usize = nodes.iter().map(|n| n.edges.len()).sum();
        debug!(
            "planning graph built: {} nodes, {} edges from {} actions",
            nodes.len(),
            edge_count,
            actions.len()
        );

        Ok(Self {
            actions,
            nodes,
            index,
            start: 0,
        })
    }

    /// The node the graph was expanded from.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The world state of the start node.
    pub fn start_state(&self) -> &WorldState {
        &self.nodes[self.start].state
    }

    /// The node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this graph.
    pub fn node(&self, id: NodeId) -> &GoalNode {
        &self.nodes[id]
    }

    /// Looks up the node holding exactly the given world state, if one is
    /// reachable.
    pub fn node_id(&self, state: &WorldState) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    /// The number of distinct reachable world states.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The total number of action edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// The action set this graph was built from, in query order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The action fired by an edge's `action` index.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range for the graph's action set.
    pub fn action(&self, idx: usize) -> &Action {
        &self.actions[idx]
    }
}
