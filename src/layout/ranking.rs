use std::collections::VecDeque;

use crate::ir::NodeKind;

use super::error::{Diagnostics, LayoutWarning};
use super::graph::FlowGraph;

/// Level per node plus the nodes grouped by level, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Levels {
    pub(crate) level: Vec<usize>,
    pub(crate) groups: Vec<Vec<usize>>,
    pub(crate) orphans: Vec<usize>,
}

pub(crate) fn assign_levels(graph: &FlowGraph<'_>, diagnostics: &mut Diagnostics) -> Levels {
    assign_levels_bounded(graph, graph.node_count() * 2, diagnostics)
}

pub(super) fn start_nodes(graph: &FlowGraph<'_>, diagnostics: &mut Diagnostics) -> Vec<usize> {
    let starts: Vec<usize> = (0..graph.node_count())
        .filter(|&idx| graph.node(idx).kind == NodeKind::Start)
        .collect();
    if !starts.is_empty() {
        return starts;
    }

    let sources: Vec<usize> = (0..graph.node_count())
        .filter(|&idx| graph.in_degree(idx) == 0)
        .collect();
    if !sources.is_empty() {
        return sources;
    }

    if graph.node_count() == 0 {
        return Vec::new();
    }
    diagnostics.warn(LayoutWarning::FallbackStart(graph.id(0).to_string()));
    vec![0]
}

/// Breadth-first leveling over primary edges. A node keeps the level of its
/// first visit, so levels are shortest hop counts from the start set.
pub(super) fn assign_levels_bounded(
    graph: &FlowGraph<'_>,
    max_visits: usize,
    diagnostics: &mut Diagnostics,
) -> Levels {
    let node_count = graph.node_count();
    let mut level: Vec<Option<usize>> = vec![None; node_count];
    let mut discovered = Vec::with_capacity(node_count);
    let mut queue = VecDeque::new();

    for start in start_nodes(graph, diagnostics) {
        if level[start].is_none() {
            level[start] = Some(0);
            discovered.push(start);
            queue.push_back(start);
        }
    }

    // Every primary edge examined counts as one visit.
    let mut visits = 0usize;
    'walk: while let Some(current) = queue.pop_front() {
        let next_level = level[current].unwrap_or(0) + 1;
        for &target in graph.targets(current) {
            if visits >= max_visits {
                diagnostics.warn(LayoutWarning::VisitBoundExceeded { visits });
                break 'walk;
            }
            visits += 1;
            if level[target].is_none() {
                level[target] = Some(next_level);
                discovered.push(target);
                queue.push_back(target);
            }
        }
    }

    let mut orphans = Vec::new();
    for (idx, slot) in level.iter_mut().enumerate() {
        if slot.is_none() {
            *slot = Some(0);
            orphans.push(idx);
            diagnostics.warn(LayoutWarning::OrphanNode(graph.id(idx).to_string()));
        }
    }

    let level: Vec<usize> = level.into_iter().map(|slot| slot.unwrap_or(0)).collect();
    let depth = level.iter().copied().max().map(|max| max + 1).unwrap_or(0);
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for &idx in discovered.iter().chain(orphans.iter()) {
        groups[level[idx]].push(idx);
    }

    tracing::debug!(levels = depth, orphans = orphans.len(), visits, "assigned levels");

    Levels {
        level,
        groups,
        orphans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Connection, Flow, FlowNode};

    fn ids(graph: &FlowGraph<'_>, group: &[usize]) -> Vec<String> {
        group.iter().map(|&idx| graph.id(idx).to_string()).collect()
    }

    #[test]
    fn levels_are_shortest_hop_counts() {
        let flow = Flow::new(
            vec![
                FlowNode::new("s", NodeKind::Start),
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("b", NodeKind::Step),
                FlowNode::new("e", NodeKind::End),
            ],
            vec![
                Connection::new("s", "a"),
                Connection::new("a", "b"),
                Connection::new("b", "e"),
                Connection::new("s", "e"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let mut diagnostics = Diagnostics::default();
        let levels = assign_levels(&graph, &mut diagnostics);
        assert_eq!(levels.level, vec![0, 1, 2, 1]);
        assert_eq!(ids(&graph, &levels.groups[1]), vec!["a", "e"]);
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn secondary_edges_never_shorten_paths() {
        let flow = Flow::new(
            vec![
                FlowNode::new("s", NodeKind::Start),
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("b", NodeKind::Step),
            ],
            vec![
                Connection::new("s", "a"),
                Connection::new("a", "b"),
                Connection::new("s", "b").secondary(),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let levels = assign_levels(&graph, &mut Diagnostics::default());
        assert_eq!(levels.level, vec![0, 1, 2]);
    }

    #[test]
    fn zero_in_degree_nodes_start_when_no_start_kind() {
        let flow = Flow::new(
            vec![
                FlowNode::new("x", NodeKind::Step),
                FlowNode::new("y", NodeKind::Entrypoint),
            ],
            vec![Connection::new("y", "x")],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let mut diagnostics = Diagnostics::default();
        let levels = assign_levels(&graph, &mut diagnostics);
        assert_eq!(levels.level, vec![1, 0]);
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn closed_cycle_falls_back_to_first_node() {
        let flow = Flow::new(
            vec![
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("b", NodeKind::Step),
                FlowNode::new("c", NodeKind::Step),
            ],
            vec![
                Connection::new("a", "b"),
                Connection::new("b", "c"),
                Connection::new("c", "a"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let mut diagnostics = Diagnostics::default();
        let levels = assign_levels(&graph, &mut diagnostics);
        assert_eq!(levels.level, vec![0, 1, 2]);
        assert_eq!(
            diagnostics.warnings(),
            &[LayoutWarning::FallbackStart("a".to_string())]
        );
    }

    #[test]
    fn unreachable_nodes_are_flagged_at_level_zero() {
        let flow = Flow::new(
            vec![
                FlowNode::new("s", NodeKind::Start),
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("loop1", NodeKind::Step),
                FlowNode::new("loop2", NodeKind::Step),
            ],
            vec![
                Connection::new("s", "a"),
                Connection::new("loop1", "loop2"),
                Connection::new("loop2", "loop1"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let mut diagnostics = Diagnostics::default();
        let levels = assign_levels(&graph, &mut diagnostics);
        assert_eq!(levels.level, vec![0, 1, 0, 0]);
        assert_eq!(levels.orphans, vec![2, 3]);
        assert_eq!(ids(&graph, &levels.groups[0]), vec!["s", "loop1", "loop2"]);
        assert_eq!(diagnostics.warnings().len(), 2);
    }

    #[test]
    fn visit_bound_stops_traversal_with_warning() {
        let flow = Flow::new(
            vec![
                FlowNode::new("s", NodeKind::Start),
                FlowNode::new("a", NodeKind::Step),
                FlowNode::new("b", NodeKind::Step),
                FlowNode::new("c", NodeKind::Step),
            ],
            vec![
                Connection::new("s", "a"),
                Connection::new("a", "b"),
                Connection::new("b", "c"),
            ],
        );
        let graph = FlowGraph::build(&flow).expect("graph");
        let mut diagnostics = Diagnostics::default();
        let levels = assign_levels_bounded(&graph, 2, &mut diagnostics);
        // s->a and a->b were examined; b->c hit the bound, so c is orphaned.
        assert_eq!(levels.level, vec![0, 1, 2, 0]);
        assert_eq!(
            diagnostics.warnings()[0],
            LayoutWarning::VisitBoundExceeded { visits: 2 }
        );
        assert_eq!(levels.orphans, vec![3]);
    }

    #[test]
    fn dense_cycles_trip_the_default_visit_bound() {
        let names = ["a", "b", "c"];
        let nodes = names
            .iter()
            .map(|name| FlowNode::new(name, NodeKind::Step))
            .collect();
        let connections = names
            .iter()
            .flat_map(|from| names.iter().map(move |to| Connection::new(from, to)))
            .collect();
        let flow = Flow::new(nodes, connections);
        let graph = FlowGraph::build(&flow).expect("graph");
        let mut diagnostics = Diagnostics::default();
        let levels = assign_levels(&graph, &mut diagnostics);
        assert_eq!(levels.level, vec![0, 1, 1]);
        assert_eq!(
            diagnostics.warnings(),
            &[
                LayoutWarning::FallbackStart("a".to_string()),
                LayoutWarning::VisitBoundExceeded { visits: 6 },
            ]
        );
    }

    #[test]
    fn empty_graph_has_no_levels() {
        let flow = Flow::default();
        let graph = FlowGraph::build(&flow).expect("graph");
        let levels = assign_levels(&graph, &mut Diagnostics::default());
        assert!(levels.groups.is_empty());
    }
}
