use crate::ir::{Connection, LineType, NodeKind, Side};

use super::error::{Diagnostics, LayoutWarning};
use super::graph::FlowGraph;
use super::types::{ConnectorPlan, LabelPlacement, Position, StrokeStyle};

/// Start sides handed to a decision's primary outputs, in declaration order.
const DECISION_MAGNETS: [Side; 3] = [Side::Top, Side::Right, Side::Bottom];

// ── Label offsets ──────────────────────────────────────────────────
/// Gap between the source box and a label placed near the connector start.
const LABEL_START_OFFSET: f32 = 12.0;
/// Downward shift of mid-line labels so they clear the stroke.
const LABEL_MID_SHIFT: f32 = 10.0;

pub(crate) struct ConnectorRouter<'g, 'a> {
    graph: &'g FlowGraph<'a>,
    positions: &'g [Position],
}

impl<'g, 'a> ConnectorRouter<'g, 'a> {
    pub(crate) fn new(graph: &'g FlowGraph<'a>, positions: &'g [Position]) -> Self {
        Self { graph, positions }
    }

    pub(crate) fn route_all(&self, diagnostics: &mut Diagnostics) -> Vec<ConnectorPlan> {
        (0..self.graph.flow().connections.len())
            .map(|conn_idx| self.route(conn_idx, diagnostics))
            .collect()
    }

    pub(crate) fn route(&self, conn_idx: usize, diagnostics: &mut Diagnostics) -> ConnectorPlan {
        let conn = self.graph.connection(conn_idx);
        let (from, to) = self.graph.endpoints(conn_idx);
        let source = self.graph.node(from);
        let target = self.graph.node(to);

        let mut line_type = LineType::Straight;
        let mut start_side = Side::Right;
        let mut placement = LabelPlacement::MidLine;
        if source.kind == NodeKind::Decision {
            line_type = LineType::Elbow;
            placement = LabelPlacement::NearStart;
            start_side = if conn.secondary {
                Side::Bottom
            } else {
                self.decision_magnet(from, conn, diagnostics)
            };
        } else if conn.secondary {
            line_type = LineType::Elbow;
            start_side = Side::Bottom;
        } else if self.graph.in_degree(to) > 1 {
            // Merging paths get elbows so they stay distinguishable.
            line_type = LineType::Elbow;
        }

        let start_side = conn
            .exit_side
            .or_else(|| source.layout_hint.as_ref().and_then(|hint| hint.exit_side))
            .unwrap_or(start_side);
        let end_side = conn
            .entry_side
            .or_else(|| target.layout_hint.as_ref().and_then(|hint| hint.entry_side))
            .unwrap_or(Side::Left);
        let line_type = conn.line_type.unwrap_or(line_type);
        let stroke = if conn.secondary {
            StrokeStyle::Dashed
        } else {
            StrokeStyle::Solid
        };

        let label_position = if conn.label_text().is_some() {
            Some(match placement {
                LabelPlacement::NearStart => {
                    self.near_start_label(from, start_side, conn, diagnostics)
                }
                LabelPlacement::MidLine => self.mid_line_label(from, start_side, to),
            })
        } else {
            None
        };

        ConnectorPlan {
            from: conn.from.clone(),
            to: conn.to.clone(),
            line_type,
            start_side,
            end_side,
            stroke,
            label_placement: placement,
            label_position,
        }
    }

    /// Side for a primary output of a decision, by its position among the
    /// decision's primary outputs.
    fn decision_magnet(
        &self,
        decision: usize,
        conn: &Connection,
        diagnostics: &mut Diagnostics,
    ) -> Side {
        let outputs: Vec<usize> = self.graph.primary_outgoing(decision).collect();
        let index = outputs
            .iter()
            .position(|&candidate| std::ptr::eq(self.graph.connection(candidate), conn))
            .or_else(|| {
                outputs.iter().position(|&candidate| {
                    let candidate = self.graph.connection(candidate);
                    candidate.from == conn.from && candidate.to == conn.to
                })
            });

        if let Some(&side) = index.and_then(|index| DECISION_MAGNETS.get(index)) {
            return side;
        }
        diagnostics.warn(LayoutWarning::MagnetOverflow {
            decision: self.graph.id(decision).to_string(),
            to: conn.to.clone(),
            index: index.unwrap_or(outputs.len()) + 1,
        });
        Side::Right
    }

    fn near_start_label(
        &self,
        from: usize,
        side: Side,
        conn: &Connection,
        diagnostics: &mut Diagnostics,
    ) -> (f32, f32) {
        let source = &self.positions[from];
        let (cx, cy) = source.center();
        match side {
            Side::Top => (cx, source.y - LABEL_START_OFFSET),
            Side::Right => (source.x + source.width + LABEL_START_OFFSET, cy),
            Side::Bottom => (cx, source.y + source.height + LABEL_START_OFFSET),
            Side::Left => {
                diagnostics.warn(LayoutWarning::UnsupportedLabelSide {
                    from: conn.from.clone(),
                    to: conn.to.clone(),
                    side,
                });
                (cx, source.y - LABEL_START_OFFSET)
            }
        }
    }

    fn mid_line_label(&self, from: usize, side: Side, to: usize) -> (f32, f32) {
        let start = self.positions[from].side_point(side);
        let end = self.positions[to].side_point(Side::Left);
        (
            (start.0 + end.0) / 2.0,
            (start.1 + end.1) / 2.0 + LABEL_MID_SHIFT,
        )
    }
}
