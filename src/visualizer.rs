use crate::graph::PlanningGraph;
use crate::search::Plan;
use crate::Result;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;

/// Renders a preprocessed planning graph as a Graphviz DOT file, optionally
/// highlighting the edges of a plan. Debugging aid for authors whose stories
/// produce surprising arrow layouts.
#[derive(Debug, Default)]
pub struct GraphVisualizer;

impl GraphVisualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self
    }

    /// Writes the graph to `filename` in DOT format. Nodes are labeled with
    /// their world states, edges with the action name and cost; the start
    /// node is tinted green, and the edges walked by `plan` (if given) are
    /// drawn red.
    pub fn write_dot(
        &self,
        graph: &PlanningGraph,
        plan: Option<&Plan>,
        filename: &str,
    ) -> Result<()> {
        let highlighted = plan.map(|p| Self::plan_edges(graph, p)).unwrap_or_default();

        let mut file = File::create(filename)?;

        writeln!(file, "digraph plan {{")?;
        writeln!(file, "    rankdir=LR;")?;
        writeln!(
            file,
            "    node [shape=box, style=filled, fillcolor=lightblue];"
        )?;
        writeln!(file, "    edge [fontsize=10];")?;

        for id in 0..graph.node_count() {
            let fill = if id == graph.start() {
                ", fillcolor=lightgreen"
            } else {
                ""
            };
            writeln!(
                file,
                "    n{} [label=\"{}\"{}];",
                id,
                escape(&graph.node(id).state().to_string()),
                fill
            )?;
        }

        for id in 0..graph.node_count() {
            for (pos, edge) in graph.node(id).edges().iter().enumerate() {
                let action = graph.action(edge.action);
                let style = if highlighted.contains(&(id, pos)) {
                    ", color=red, penwidth=2.0"
                } else {
                    ""
                };
                writeln!(
                    file,
                    "    n{} -> n{} [label=\"{} ({})\"{}];",
                    id,
                    edge.to,
                    escape(&action.name),
                    action.cost(),
                    style
                )?;
            }
        }

        writeln!(file, "}}")?;
        Ok(())
    }

    /// Resolves a plan's steps back onto graph edges, as (node, edge
    /// position) pairs. Steps that cannot be matched (a plan from a
    /// different graph) are skipped rather than treated as errors.
    fn plan_edges(graph: &PlanningGraph, plan: &Plan) -> HashSet<(usize, usize)> {
        let mut edges = HashSet::new();
        let mut current = graph.start();

        for step in plan {
            let found = graph.node(current).edges().iter().enumerate().find(|(_, e)| {
                graph.action(e.action).name == step.action.name
                    && graph.node(e.to).state() == &step.state
            });
            match found {
                Some((pos, edge)) => {
                    edges.insert((current, pos));
                    current = edge.to;
                }
                None => break,
            }
        }

        edges
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{search, Action, WorldState};
    use std::fs;

    #[test]
    fn test_write_dot_with_plan() {
        let mut open = Action::new("open", 1.0).unwrap();
        open.effects.set("door", "open");
        let mut enter = Action::new("enter", 1.0).unwrap();
        enter.preconditions.set("door", "open");
        enter.effects.set("inside", true);

        let graph = PlanningGraph::preprocess(vec![open, enter], WorldState::new()).unwrap();
        let mut goal = WorldState::new();
        goal.set("inside", true);
        let plan = search(&graph, &goal).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.dot");
        let path = path.to_str().unwrap();

        GraphVisualizer::new()
            .write_dot(&graph, Some(&plan), path)
            .unwrap();

        let dot = fs::read_to_string(path).unwrap();
        assert!(dot.starts_with("digraph plan {"));
        assert!(dot.contains("open (1)"));
        assert!(dot.contains("color=red"));
        assert!(dot.contains("lightgreen"));
    }

    #[test]
    fn test_write_dot_without_plan() {
        let graph = PlanningGraph::preprocess(Vec::new(), WorldState::new()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dot");
        let path = path.to_str().unwrap();

        GraphVisualizer::new().write_dot(&graph, None, path).unwrap();

        let dot = fs::read_to_string(path).unwrap();
        assert!(dot.contains("n0"));
        assert!(!dot.contains("color=red"));
    }
}
