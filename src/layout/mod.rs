mod bifurcation;
mod error;
mod graph;
mod lanes;
mod position;
mod ranking;
mod routing;
pub(crate) mod types;
pub use bifurcation::BifurcationAnalysis;
pub use error::{Endpoint, LayoutError, LayoutWarning};
pub use graph::{GraphIndex, index_graph};
pub use types::*;
use bifurcation::*;
use error::*;
use graph::*;
use lanes::*;
use position::*;
use ranking::*;
use routing::*;

use crate::config::LayoutConfig;
use crate::ir::Flow;

/// Runs the full pipeline: graph, levels, bifurcations, lanes, positions and
/// connector plans. Structural errors abort without partial output; degraded
/// input is reported through [`FlowLayout::warnings`].
pub fn compute_layout(flow: &Flow, config: &LayoutConfig) -> Result<FlowLayout, LayoutError> {
    let graph = FlowGraph::build(flow)?;
    let mut diagnostics = Diagnostics::default();

    let levels = assign_levels(&graph, &mut diagnostics);
    let bifurcations = analyze_bifurcations(&graph);
    let lanes = assign_lanes(graph.node_count(), &bifurcations);
    let (positions, root) = resolve_positions(&graph, &levels, &lanes, config, &mut diagnostics)?;
    let connectors = ConnectorRouter::new(&graph, &positions).route_all(&mut diagnostics);

    let (width, height) = layout_bounds(&positions);
    let id = |idx: usize| graph.id(idx).to_string();

    Ok(FlowLayout {
        levels: levels
            .level
            .iter()
            .enumerate()
            .map(|(idx, &level)| (id(idx), level))
            .collect(),
        level_groups: levels
            .groups
            .iter()
            .enumerate()
            .filter(|(_, group)| !group.is_empty())
            .map(|(level, group)| (level, group.iter().map(|&idx| id(idx)).collect()))
            .collect(),
        orphans: levels.orphans.iter().map(|&idx| id(idx)).collect(),
        lanes: lanes
            .iter()
            .enumerate()
            .map(|(idx, &lane)| (id(idx), lane))
            .collect(),
        bifurcations: bifurcations
            .iter()
            .map(|bifurcation| bifurcation.to_analysis(&graph))
            .collect(),
        positions: positions
            .into_iter()
            .enumerate()
            .map(|(idx, position)| (id(idx), position))
            .collect(),
        connectors,
        root: root.map(id),
        width,
        height,
        warnings: diagnostics.into_warnings(),
    })
}

fn layout_bounds(positions: &[Position]) -> (f32, f32) {
    if positions.is_empty() {
        return (0.0, 0.0);
    }
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for position in positions {
        min_x = min_x.min(position.x);
        min_y = min_y.min(position.y);
        max_x = max_x.max(position.x + position.width);
        max_y = max_y.max(position.y + position.height);
    }
    (max_x - min_x, max_y - min_y)
}
