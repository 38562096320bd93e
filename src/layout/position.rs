use std::collections::{HashMap, VecDeque};

use crate::config::LayoutConfig;
use crate::ir::{NodeKind, Size};

use super::error::{Diagnostics, LayoutError, LayoutWarning};
use super::graph::FlowGraph;
use super::ranking::Levels;
use super::types::{CalculationMode, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Node placed at the origin: the first ENTRYPOINT without an anchor, else
/// the first ENTRYPOINT, else the first node.
pub(crate) fn select_root(graph: &FlowGraph<'_>) -> Option<usize> {
    let entrypoints: Vec<usize> = (0..graph.node_count())
        .filter(|&idx| graph.node(idx).kind == NodeKind::Entrypoint)
        .collect();
    entrypoints
        .iter()
        .copied()
        .find(|&idx| graph.node(idx).anchor().is_none())
        .or_else(|| entrypoints.first().copied())
        .or_else(|| (graph.node_count() > 0).then_some(0))
}

/// Resolves one position per node and returns them with the root index.
pub(crate) fn resolve_positions(
    graph: &FlowGraph<'_>,
    levels: &Levels,
    lanes: &[i32],
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) -> Result<(Vec<Position>, Option<usize>), LayoutError> {
    let Some(root) = select_root(graph) else {
        return Ok((Vec::new(), None));
    };

    let hinted: Vec<bool> = (0..graph.node_count())
        .map(|idx| idx != root && graph.node(idx).has_positional_hint())
        .collect();
    if graph.node(root).has_positional_hint() {
        diagnostics.warn(LayoutWarning::RootHintIgnored(graph.id(root).to_string()));
    }

    let mut positions = auto_positions(graph, levels, lanes, config, &hinted);

    // Register the auto grid so the root sits on the origin.
    let dx = config.origin_x - positions[root].x;
    let dy = (config.center_y - positions[root].height / 2.0) - positions[root].y;
    for position in positions.iter_mut() {
        position.x += dx;
        position.y += dy;
    }
    positions[root].mode = CalculationMode::Manual;

    resolve_anchors(graph, root, &hinted, &mut positions, config)?;
    report_collisions(graph, &positions, config, diagnostics);

    Ok((positions, Some(root)))
}

fn auto_positions(
    graph: &FlowGraph<'_>,
    levels: &Levels,
    lanes: &[i32],
    config: &LayoutConfig,
    hinted: &[bool],
) -> Vec<Position> {
    let sizes: Vec<Size> = (0..graph.node_count())
        .map(|idx| {
            let node = graph.node(idx);
            config.node_size(node.kind, node.size)
        })
        .collect();

    let mut positions: Vec<Position> = sizes
        .iter()
        .zip(lanes)
        .map(|(size, &lane)| Position {
            x: config.origin_x,
            y: config.center_y - size.height / 2.0,
            width: size.width,
            height: size.height,
            lane,
            mode: CalculationMode::Auto,
            anchor_used: None,
        })
        .collect();

    let mut column_x = config.origin_x;
    for group in &levels.groups {
        let members: Vec<usize> = group.iter().copied().filter(|&idx| !hinted[idx]).collect();
        if members.is_empty() {
            continue;
        }
        let column_width = members
            .iter()
            .map(|&idx| sizes[idx].width)
            .fold(0.0f32, f32::max);

        // Bottom edge of the last node stacked in each lane of this column.
        let mut stack_bottom: HashMap<i32, f32> = HashMap::new();
        for &idx in &members {
            let size = sizes[idx];
            let lane = lanes[idx];
            let top = match stack_bottom.get(&lane) {
                Some(bottom) => bottom + config.vertical_spacing,
                None => config.center_y - lane as f32 * config.lane_height - size.height / 2.0,
            };
            stack_bottom.insert(lane, top + size.height);
            let position = &mut positions[idx];
            position.x = column_x + (column_width - size.width) / 2.0;
            position.y = top;
        }
        column_x += column_width + config.horizontal_spacing;
    }

    positions
}

fn resolve_anchors(
    graph: &FlowGraph<'_>,
    root: usize,
    hinted: &[bool],
    positions: &mut [Position],
    config: &LayoutConfig,
) -> Result<(), LayoutError> {
    let node_count = graph.node_count();
    let mut anchor_of: Vec<Option<usize>> = vec![None; node_count];
    for idx in 0..node_count {
        let node = graph.node(idx);
        if let Some(anchor) = node.anchor() {
            let target = graph
                .index_of(anchor)
                .ok_or_else(|| LayoutError::UnknownAnchor {
                    node: node.id.clone(),
                    anchor: anchor.to_string(),
                })?;
            anchor_of[idx] = Some(target);
        }
    }

    // The root's anchor is checked for cycles but never used for placement.
    detect_anchor_cycle(graph, &anchor_of)?;
    anchor_of[root] = None;

    // Kahn's algorithm over "anchor -> dependent" edges between hinted nodes.
    // Anchors that are the root or auto-placed are already resolved.
    let mut pending = vec![0usize; node_count];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for idx in 0..node_count {
        if let Some(anchor) = anchor_of[idx]
            && hinted[anchor]
        {
            pending[idx] += 1;
            dependents[anchor].push(idx);
        }
    }

    let mut ready: VecDeque<usize> = (0..node_count)
        .filter(|&idx| hinted[idx] && pending[idx] == 0)
        .collect();
    let mut resolved = 0usize;
    while let Some(idx) = ready.pop_front() {
        let base = anchor_of[idx].unwrap_or(root);
        let (base_x, base_y) = (positions[base].x, positions[base].y);
        let offset = graph
            .node(idx)
            .layout_hint
            .as_ref()
            .and_then(|hint| hint.offset)
            .unwrap_or_default();

        let position = &mut positions[idx];
        position.x = base_x + offset.x * config.base_unit;
        position.y = base_y + offset.y * config.base_unit;
        position.mode = CalculationMode::Manual;
        position.anchor_used = anchor_of[idx].map(|anchor| graph.id(anchor).to_string());
        resolved += 1;

        for &dependent in &dependents[idx] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push_back(dependent);
            }
        }
    }

    tracing::debug!(resolved, "resolved anchored positions");
    Ok(())
}

/// Walks every anchor chain with a visiting set; reaching a node that is
/// still being visited means the chain loops back on itself.
fn detect_anchor_cycle(
    graph: &FlowGraph<'_>,
    anchor_of: &[Option<usize>],
) -> Result<(), LayoutError> {
    let mut marks = vec![Mark::Unvisited; anchor_of.len()];
    for start in 0..anchor_of.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            match marks[idx] {
                Mark::Done => break,
                Mark::Visiting => return Err(LayoutError::AnchorCycle(graph.id(idx).to_string())),
                Mark::Unvisited => {
                    marks[idx] = Mark::Visiting;
                    chain.push(idx);
                    current = anchor_of[idx];
                }
            }
        }
        for idx in chain {
            marks[idx] = Mark::Done;
        }
    }
    Ok(())
}

fn report_collisions(
    graph: &FlowGraph<'_>,
    positions: &[Position],
    config: &LayoutConfig,
    diagnostics: &mut Diagnostics,
) {
    let (limit_x, limit_y) = config.collision_limits();
    let manual: Vec<usize> = (0..positions.len())
        .filter(|&idx| positions[idx].mode == CalculationMode::Manual)
        .collect();
    for (offset, &first) in manual.iter().enumerate() {
        for &second in &manual[offset + 1..] {
            let dx = (positions[first].x - positions[second].x).abs();
            let dy = (positions[first].y - positions[second].y).abs();
            if dx < limit_x && dy < limit_y {
                diagnostics.warn(LayoutWarning::NearCollision {
                    first: graph.id(first).to_string(),
                    second: graph.id(second).to_string(),
                    dx,
                    dy,
                });
            }
        }
    }
}
