use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::{LineType, Side};

use super::bifurcation::BifurcationAnalysis;
use super::error::LayoutWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    Manual,
    Auto,
}

/// Resolved box of a node. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lane: i32,
    pub mode: CalculationMode,
    pub anchor_used: Option<String>,
}

impl Position {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint of the given side of the box.
    pub fn side_point(&self, side: Side) -> (f32, f32) {
        let (cx, cy) = self.center();
        match side {
            Side::Left => (self.x, cy),
            Side::Right => (self.x + self.width, cy),
            Side::Top => (cx, self.y),
            Side::Bottom => (cx, self.y + self.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelPlacement {
    NearStart,
    MidLine,
}

/// Routing descriptor for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPlan {
    pub from: String,
    pub to: String,
    pub line_type: LineType,
    pub start_side: Side,
    pub end_side: Side,
    pub stroke: StrokeStyle,
    pub label_placement: LabelPlacement,
    pub label_position: Option<(f32, f32)>,
}

/// Complete layout of a flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLayout {
    pub levels: BTreeMap<String, usize>,
    pub level_groups: BTreeMap<usize, Vec<String>>,
    /// Nodes no start node reaches; they sit at level 0.
    pub orphans: Vec<String>,
    pub lanes: BTreeMap<String, i32>,
    pub bifurcations: Vec<BifurcationAnalysis>,
    pub positions: BTreeMap<String, Position>,
    /// One plan per connection, in connection input order.
    pub connectors: Vec<ConnectorPlan>,
    pub root: Option<String>,
    pub width: f32,
    pub height: f32,
    pub warnings: Vec<LayoutWarning>,
}

impl FlowLayout {
    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn lane(&self, id: &str) -> Option<i32> {
        self.lanes.get(id).copied()
    }

    pub fn level(&self, id: &str) -> Option<usize> {
        self.levels.get(id).copied()
    }
}
