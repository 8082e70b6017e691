//! Best-first (A*) search over a preprocessed planning graph.
//!
//! [`search`] walks a [`PlanningGraph`] from its start node to the first node
//! whose state satisfies the goal facts, returning the lowest-cost ordered
//! [`Plan`] of actions, or `None` when no reachable node satisfies the goal.
//! Unreachability is an expected outcome, not an error.
//!
//! The search is a single pure computation: open/closed bookkeeping lives on
//! the stack of one call, and nothing is shared between invocations, so
//! several searches may run against the same graph (the multi-goal
//! decomposition does exactly that).

use crate::graph::{NodeId, PlanningGraph};
use crate::{Action, WorldState};
use log::debug;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// One step of a plan: the action fired and the world state of the node it
/// leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    /// The action fired by this step
    pub action: Action,
    /// The world state reached after the action fires
    pub state: WorldState,
}

/// An ordered sequence of actions connecting a start state to a goal state,
/// with its total path cost.
///
/// A plan may be empty: searching for a goal the start state already
/// satisfies yields a successful zero-length, zero-cost plan. An
/// *unreachable* goal is represented by the absence of a plan (`None` from
/// [`search`]), never by an error.
///
/// # Examples
///
/// ```
/// use passage_planner::{search, Action, PlanningGraph, WorldState};
///
/// let mut light = Action::new("Light the lamp", 1.0).unwrap();
/// light.effects.set("room", "lit");
///
/// let graph = PlanningGraph::preprocess(vec![light], WorldState::new()).unwrap();
///
/// let mut goal = WorldState::new();
/// goal.set("room", "lit");
///
/// let plan = search(&graph, &goal).unwrap();
/// assert_eq!(plan.action_names(), ["Light the lamp"]);
/// assert_eq!(plan.cost(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    steps: Vec<PlanStep>,
    cost: f64,
}

impl Plan {
    /// The successful zero-length plan, used when the start state already
    /// satisfies the goal.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The ordered steps of this plan, from the first action after the start
    /// state to the action reaching the goal.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// The total path cost: the sum of the traversed actions' costs.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The number of actions in the plan.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` for the zero-length plan.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The names of the plan's actions in order. The UI maps these back to
    /// passages to draw its arrows.
    pub fn action_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.action.name.as_str()).collect()
    }

    /// Iterates over the plan's steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PlanStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlanStep;
    type IntoIter = std::slice::Iter<'a, PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Estimated remaining cost: the number of goal facts the state does not yet
/// satisfy. Admissible as long as every action costs at least 1, since no
/// single action can satisfy a goal fact for less than one cost unit.
fn heuristic(state: &WorldState, goal: &WorldState) -> f64 {
    goal.iter()
        .filter(|(key, value)| state.get(key) != Some(*value))
        .count() as f64
}

/// An open-set entry. Ordered by `f`, then by discovery sequence so that of
/// two equal-`f` entries the earlier-discovered one is expanded first,
/// keeping results deterministic across runs on identical input.
#[derive(Debug, Clone, PartialEq)]
struct OpenEntry {
    f: f64,
    g: f64,
    seq: u64,
    node: NodeId,
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds the lowest-cost ordered sequence of actions from the graph's start
/// node to the first node satisfying `goal`.
///
/// The goal test is partial matching: a node satisfies the goal when its
/// state contains every goal fact with an equal value, extra facts ignored.
///
/// Returns:
/// - `Some(plan)` with the ordered steps and total cost when the goal is
///   reachable;
/// - `Some(Plan::empty())` when the start state already satisfies the goal;
/// - `None` when no reachable node satisfies the goal.
///
/// Repeated invocations on identical input return identical plans (stable
/// tie-breaking).
pub fn search(graph: &PlanningGraph, goal: &WorldState) -> Option<Plan> {
    if graph.start_state().satisfies(goal) {
        return Some(Plan::empty());
    }

    let node_count = graph.node_count();
    let start = graph.start();

    // Best known path cost per node; predecessor edge for reconstruction.
    let mut best_g = vec![f64::INFINITY; node_count];
    let mut parent: Vec<Option<(NodeId, usize)>> = vec![None; node_count];

    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    best_g[start] = 0.0;
    open.push(Reverse(OpenEntry {
        f: heuristic(graph.start_state(), goal),
        g: 0.0,
        seq,
        node: start,
    }));

    while let Some(Reverse(entry)) = open.pop() {
        // A cheaper path to this node was found after this entry was queued.
        if entry.g > best_g[entry.node] {
            continue;
        }

        let node = graph.node(entry.node);
        if node.state().satisfies(goal) {
            let plan = reconstruct(graph, &parent, entry.node, best_g[entry.node]);
            debug!(
                "plan found: {} steps, cost {}, goal {}",
                plan.len(),
                plan.cost(),
                goal
            );
            return Some(plan);
        }

        for edge in node.edges() {
            let tentative = best_g[entry.node] + graph.action(edge.action).cost();
            if tentative < best_g[edge.to] {
                best_g[edge.to] = tentative;
                parent[edge.to] = Some((entry.node, edge.action));
                seq += 1;
                open.push(Reverse(OpenEntry {
                    f: tentative + heuristic(graph.node(edge.to).state(), goal),
                    g: tentative,
                    seq,
                    node: edge.to,
                }));
            }
        }
    }

    debug!("goal unreachable: {}", goal);
    None
}

/// Walks the recorded predecessor edges backwards from the goal node,
/// producing the ordered start-to-goal step sequence.
fn reconstruct(
    graph: &PlanningGraph,
    parent: &[Option<(NodeId, usize)>],
    goal_node: NodeId,
    cost: f64,
) -> Plan {
    let mut steps = Vec::new();
    let mut current = goal_node;

    while let Some((prev, action_idx)) = parent[current] {
        steps.push(PlanStep {
            action: graph.action(action_idx).clone(),
            state: graph.node(current).state().clone(),
        });
        current = prev;
    }

    steps.reverse();
    Plan { steps, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;

    fn action(name: &str, cost: f64, pre: &[(&str, &str)], eff: &[(&str, &str)]) -> Action {
        let mut a = Action::new(name, cost).unwrap();
        for (k, v) in pre {
            a.preconditions.set(*k, *v);
        }
        for (k, v) in eff {
            a.effects.set(*k, *v);
        }
        a
    }

    fn goal(facts: &[(&str, &str)]) -> WorldState {
        let mut g = WorldState::new();
        for (k, v) in facts {
            g.set(*k, *v);
        }
        g
    }

    #[test]
    fn test_two_step_plan() {
        let a = action("a", 1.0, &[], &[("door", "open")]);
        let b = action("b", 1.0, &[("door", "open")], &[("room", "lit")]);
        let graph = PlanningGraph::preprocess(vec![a, b], WorldState::new()).unwrap();

        let plan = search(&graph, &goal(&[("room", "lit")])).unwrap();
        assert_eq!(plan.action_names(), ["a", "b"]);
        assert_eq!(plan.cost(), 2.0);
    }

    #[test]
    fn test_prefers_cheaper_path() {
        let cheap = action("cheap", 1.0, &[], &[("goal", "yes")]);
        let pricey = action("pricey", 5.0, &[], &[("goal", "yes"), ("extra", "fact")]);
        let graph = PlanningGraph::preprocess(vec![pricey, cheap], WorldState::new()).unwrap();

        let plan = search(&graph, &goal(&[("goal", "yes")])).unwrap();
        assert_eq!(plan.action_names(), ["cheap"]);
        assert_eq!(plan.cost(), 1.0);
    }

    #[test]
    fn test_goal_already_satisfied() {
        let mut start = WorldState::new();
        start.set("room", "lit");
        let a = action("a", 1.0, &[], &[("other", "thing")]);
        let graph = PlanningGraph::preprocess(vec![a], start).unwrap();

        let plan = search(&graph, &goal(&[("room", "lit")])).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.cost(), 0.0);
    }

    #[test]
    fn test_unreachable_goal() {
        let a = action("a", 1.0, &[], &[("door", "open")]);
        let graph = PlanningGraph::preprocess(vec![a], WorldState::new()).unwrap();

        assert!(search(&graph, &goal(&[("nonexistent", "fact")])).is_none());
    }

    #[test]
    fn test_unreachable_with_no_applicable_actions() {
        let a = action("a", 1.0, &[("missing", "pre")], &[("goal", "yes")]);
        let graph = PlanningGraph::preprocess(vec![a], WorldState::new()).unwrap();

        assert!(search(&graph, &goal(&[("goal", "yes")])).is_none());
    }

    #[test]
    fn test_cost_monotonic_along_plan() {
        let a = action("a", 2.0, &[], &[("s1", "t")]);
        let b = action("b", 3.0, &[("s1", "t")], &[("s2", "t")]);
        let c = action("c", 1.0, &[("s2", "t")], &[("s3", "t")]);
        let graph = PlanningGraph::preprocess(vec![a, b, c], WorldState::new()).unwrap();

        let plan = search(&graph, &goal(&[("s3", "t")])).unwrap();
        assert_eq!(plan.cost(), 6.0);

        let mut running = 0.0;
        for step in &plan {
            let next = running + step.action.cost();
            assert!(next > running); // every edge contributes at least 1
            running = next;
        }
        assert_eq!(running, plan.cost());
    }

    #[test]
    fn test_step_states_follow_effects() {
        let a = action("a", 1.0, &[], &[("door", "open")]);
        let b = action("b", 1.0, &[("door", "open")], &[("room", "lit")]);
        let graph = PlanningGraph::preprocess(vec![a, b], WorldState::new()).unwrap();

        let plan = search(&graph, &goal(&[("room", "lit")])).unwrap();
        let steps = plan.steps();
        assert_eq!(steps[0].state, goal(&[("door", "open")]));
        assert_eq!(
            steps[1].state,
            goal(&[("door", "open"), ("room", "lit")])
        );
    }

    #[test]
    fn test_deterministic_tie_break() {
        // Two equal-cost single-step plans; the earlier-discovered successor
        // (first action in query order) must win every time.
        let left = action("left", 1.0, &[], &[("exit", "left")]);
        let right = action("right", 1.0, &[], &[("exit", "right")]);
        let graph = PlanningGraph::preprocess(vec![left, right], WorldState::new()).unwrap();

        // Either exit satisfies a goal on a shared fact asserted by both.
        let both_goal = WorldState::new();
        for _ in 0..10 {
            let plan = search(&graph, &both_goal).unwrap();
            assert!(plan.is_empty()); // empty goal: start already satisfies
        }

        for _ in 0..10 {
            let plan = search(&graph, &goal(&[("exit", "left")])).unwrap();
            assert_eq!(plan.action_names(), ["left"]);
        }
    }

    #[test]
    fn test_longer_cheap_path_beats_short_expensive_one() {
        let direct = action("direct", 10.0, &[], &[("goal", "yes")]);
        let step1 = action("step1", 1.0, &[], &[("mid", "t")]);
        let step2 = action("step2", 1.0, &[("mid", "t")], &[("goal", "yes")]);
        let graph =
            PlanningGraph::preprocess(vec![direct, step1, step2], WorldState::new()).unwrap();

        let plan = search(&graph, &goal(&[("goal", "yes")])).unwrap();
        assert_eq!(plan.action_names(), ["step1", "step2"]);
        assert_eq!(plan.cost(), 2.0);
    }

    #[test]
    fn test_clamped_costs_count_as_one() {
        let free = action("free", 0.0, &[], &[("a", "t")]);
        let discount = action("discount", -3.0, &[("a", "t")], &[("b", "t")]);
        let graph = PlanningGraph::preprocess(vec![free, discount], WorldState::new()).unwrap();

        let plan = search(&graph, &goal(&[("b", "t")])).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.cost(), 2.0); // both authored costs floored to 1
    }
}
