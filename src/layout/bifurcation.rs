use crate::ir::NodeKind;

use super::graph::FlowGraph;

/// A decision with exactly two primary outputs, traced along both branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bifurcation {
    pub(crate) decision: usize,
    pub(crate) upper: Vec<usize>,
    pub(crate) lower: Vec<usize>,
    pub(crate) convergence: Option<usize>,
}

/// Public, id-based view of a [`Bifurcation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BifurcationAnalysis {
    pub decision_node_id: String,
    pub upper: Vec<String>,
    pub lower: Vec<String>,
    pub convergence_node_id: Option<String>,
}

impl Bifurcation {
    pub(crate) fn to_analysis(&self, graph: &FlowGraph<'_>) -> BifurcationAnalysis {
        let ids = |path: &[usize]| -> Vec<String> {
            path.iter().map(|&idx| graph.id(idx).to_string()).collect()
        };
        BifurcationAnalysis {
            decision_node_id: graph.id(self.decision).to_string(),
            upper: ids(&self.upper),
            lower: ids(&self.lower),
            convergence_node_id: self.convergence.map(|idx| graph.id(idx).to_string()),
        }
    }
}

/// One record per binary decision, in node input order.
pub(crate) fn analyze_bifurcations(graph: &FlowGraph<'_>) -> Vec<Bifurcation> {
    let mut found = Vec::new();
    for idx in 0..graph.node_count() {
        if graph.node(idx).kind != NodeKind::Decision {
            continue;
        }
        let outputs: Vec<usize> = graph.primary_outgoing(idx).collect();
        let &[first, second] = outputs.as_slice() else {
            continue;
        };
        let upper = trace_branch(graph, graph.endpoints(first).1);
        let lower = trace_branch(graph, graph.endpoints(second).1);
        let convergence = find_convergence(graph, &upper, &lower);
        found.push(Bifurcation {
            decision: idx,
            upper,
            lower,
            convergence,
        });
    }
    tracing::debug!(count = found.len(), "analyzed bifurcations");
    found
}

/// Follows the single primary edge out of each node, starting at `start`.
///
/// The walk ends at a node with more than one incoming connection (a merge
/// candidate), at a node without exactly one primary output, or when it comes
/// back to a node it already visited. The stopping node is part of the path.
fn trace_branch(graph: &FlowGraph<'_>, start: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut seen = vec![false; graph.node_count()];
    let mut current = start;
    loop {
        if seen[current] {
            break;
        }
        seen[current] = true;
        path.push(current);
        if graph.incoming_total(current) > 1 {
            break;
        }
        match graph.targets(current) {
            [next] => current = *next,
            _ => break,
        }
    }
    path
}

/// First connection target, in input order, fed from both branch paths.
fn find_convergence(graph: &FlowGraph<'_>, upper: &[usize], lower: &[usize]) -> Option<usize> {
    let node_count = graph.node_count();
    let mut in_upper = vec![false; node_count];
    let mut in_lower = vec![false; node_count];
    for &idx in upper {
        in_upper[idx] = true;
    }
    for &idx in lower {
        in_lower[idx] = true;
    }

    let mut checked = vec![false; node_count];
    for conn_idx in 0..graph.flow().connections.len() {
        let (_, target) = graph.endpoints(conn_idx);
        if checked[target] {
            continue;
        }
        checked[target] = true;
        let sources = graph
            .incoming(target)
            .iter()
            .map(|&incoming| graph.endpoints(incoming).0);
        let (mut from_upper, mut from_lower) = (false, false);
        for source in sources {
            from_upper |= in_upper[source];
            from_lower |= in_lower[source];
        }
        if from_upper && from_lower {
            return Some(target);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Connection, Flow, FlowNode};

    fn diamond() -> Flow {
        Flow::new(
            vec![
                FlowNode::new("S", NodeKind::Start),
                FlowNode::new("D", NodeKind::Decision),
                FlowNode::new("U", NodeKind::Step),
                FlowNode::new("L", NodeKind::Step),
                FlowNode::new("C", NodeKind::Step),
                FlowNode::new("E", NodeKind::End),
            ],
            vec![
                Connection::new("S", "D"),
                Connection::new("D", "U"),
                Connection::new("D", "L"),
                Connection::new("U", "C"),
                Connection::new("L", "C"),
                Connection::new("C", "E"),
            ],
        )
    }

    #[test]
    fn diamond_branches_meet_at_convergence() {
        let flow = diamond();
        let graph = FlowGraph::build(&flow).expect("graph");
        let found = analyze_bifurcations(&graph);
        assert_eq!(found.len(), 1);
        let analysis = found[0].to_analysis(&graph);
        assert_eq!(analysis.decision_node_id, "D");
        assert_eq!(analysis.upper, vec!["U", "C"]);
        assert_eq!(analysis.lower, vec!["L", "C"]);
        assert_eq!(analysis.convergence_node_id.as_deref(), Some("C"));
    }

    #[test]
    fn independent_terminations_have_no_convergence() {
        let flow = Flow::new(
            vec![
                FlowNode::new("D", NodeKind::Decision),
                FlowNode::new("A", NodeKind::Step),
                FlowNode::new("A2", NodeKind::End),
                FlowNode::new("B", NodeKind::End),
            ],
            vec![
                Connection::new("D", "A"),
                Connection::new("A", "A2"),
                Connection::new("D", "B"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let found = analyze_bifurcations(&graph);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].upper, vec![1, 2]);
        assert_eq!(found[0].lower, vec![3]);
        assert_eq!(found[0].convergence, None);
    }

    #[test]
    fn only_two_primary_outputs_make_a_bifurcation() {
        let flow = Flow::new(
            vec![
                FlowNode::new("one", NodeKind::Decision),
                FlowNode::new("three", NodeKind::Decision),
                FlowNode::new("mixed", NodeKind::Decision),
                FlowNode::new("x", NodeKind::End),
                FlowNode::new("y", NodeKind::End),
                FlowNode::new("z", NodeKind::End),
            ],
            vec![
                Connection::new("one", "x"),
                Connection::new("three", "x"),
                Connection::new("three", "y"),
                Connection::new("three", "z"),
                Connection::new("mixed", "x"),
                Connection::new("mixed", "y"),
                Connection::new("mixed", "z").secondary(),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let found = analyze_bifurcations(&graph);
        assert_eq!(found.len(), 1);
        assert_eq!(graph.id(found[0].decision), "mixed");
    }

    #[test]
    fn steps_with_two_outputs_are_not_bifurcations() {
        let flow = Flow::new(
            vec![
                FlowNode::new("s", NodeKind::Step),
                FlowNode::new("a", NodeKind::End),
                FlowNode::new("b", NodeKind::End),
            ],
            vec![Connection::new("s", "a"), Connection::new("s", "b")],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        assert!(analyze_bifurcations(&graph).is_empty());
    }

    #[test]
    fn branch_trace_survives_loops() {
        let flow = Flow::new(
            vec![
                FlowNode::new("D", NodeKind::Decision),
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("b", NodeKind::Step),
                FlowNode::new("z", NodeKind::End),
            ],
            vec![
                Connection::new("D", "a"),
                Connection::new("a", "b"),
                Connection::new("b", "a"),
                Connection::new("D", "z"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let found = analyze_bifurcations(&graph);
        // `a` has two incoming connections, so tracing stops right there.
        assert_eq!(found[0].upper, vec![1]);
        assert_eq!(found[0].lower, vec![3]);
    }

    #[test]
    fn nested_decision_ends_outer_branch() {
        let flow = Flow::new(
            vec![
                FlowNode::new("D1", NodeKind::Decision),
                FlowNode::new("D2", NodeKind::Decision),
                FlowNode::new("p", NodeKind::End),
                FlowNode::new("q", NodeKind::End),
                FlowNode::new("r", NodeKind::End),
            ],
            vec![
                Connection::new("D1", "D2"),
                Connection::new("D1", "r"),
                Connection::new("D2", "p"),
                Connection::new("D2", "q"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let found = analyze_bifurcations(&graph);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].upper, vec![1]);
        assert_eq!(found[1].upper, vec![2]);
        assert_eq!(found[1].lower, vec![3]);
    }

    #[test]
    fn secondary_incoming_still_ends_a_branch() {
        let flow = Flow::new(
            vec![
                FlowNode::new("D", NodeKind::Decision),
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("b", NodeKind::Step),
                FlowNode::new("e", NodeKind::End),
                FlowNode::new("x", NodeKind::Step),
                FlowNode::new("z", NodeKind::End),
            ],
            vec![
                Connection::new("D", "a"),
                Connection::new("a", "b"),
                Connection::new("b", "e"),
                Connection::new("x", "b").secondary(),
                Connection::new("D", "z"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        assert_eq!(graph.in_degree(2), 1);
        let found = analyze_bifurcations(&graph);
        assert_eq!(found[0].upper, vec![1, 2]);
        assert_eq!(found[0].lower, vec![5]);
    }

    #[test]
    fn branches_rejoined_by_secondary_edge_converge() {
        let flow = Flow::new(
            vec![
                FlowNode::new("D", NodeKind::Decision),
                FlowNode::new("u", NodeKind::Step),
                FlowNode::new("l", NodeKind::Step),
                FlowNode::new("m", NodeKind::Step),
                FlowNode::new("e", NodeKind::End),
            ],
            vec![
                Connection::new("D", "u"),
                Connection::new("D", "l"),
                Connection::new("u", "m"),
                Connection::new("l", "m").secondary(),
                Connection::new("m", "e"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let found = analyze_bifurcations(&graph);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].upper, vec![1, 3]);
        assert_eq!(found[0].lower, vec![2]);
        assert_eq!(found[0].convergence, Some(3));
    }
}
