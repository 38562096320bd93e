use crate::ir::{NodeKind, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSizeConfig {
    pub start: Size,
    pub entrypoint: Size,
    pub step: Size,
    pub decision: Size,
    pub end: Size,
}

impl NodeSizeConfig {
    pub fn for_kind(&self, kind: NodeKind) -> Size {
        match kind {
            NodeKind::Start => self.start,
            NodeKind::Entrypoint => self.entrypoint,
            NodeKind::Step => self.step,
            NodeKind::Decision => self.decision,
            NodeKind::End => self.end,
        }
    }
}

impl Default for NodeSizeConfig {
    fn default() -> Self {
        Self {
            start: Size::new(120.0, 48.0),
            entrypoint: Size::new(160.0, 56.0),
            step: Size::new(200.0, 72.0),
            decision: Size::new(120.0, 120.0),
            end: Size::new(120.0, 48.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Gap between level columns.
    pub horizontal_spacing: f32,
    /// Gap between nodes stacked in the same level and lane.
    pub vertical_spacing: f32,
    /// Distance between adjacent lane center lines.
    pub lane_height: f32,
    /// Size of one abstract spacing unit used by anchor offsets.
    pub base_unit: f32,
    /// Fraction of the spacings under which two manual nodes are reported as colliding.
    pub collision_threshold: f32,
    pub origin_x: f32,
    pub center_y: f32,
    pub node_sizes: NodeSizeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 100.0,
            vertical_spacing: 40.0,
            lane_height: 160.0,
            base_unit: 40.0,
            collision_threshold: 0.4,
            origin_x: 0.0,
            center_y: 0.0,
            node_sizes: NodeSizeConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn node_size(&self, kind: NodeKind, explicit: Option<Size>) -> Size {
        explicit.unwrap_or_else(|| self.node_sizes.for_kind(kind))
    }

    /// Axis distances under which two manually placed nodes count as a near collision.
    pub fn collision_limits(&self) -> (f32, f32) {
        (
            self.horizontal_spacing * self.collision_threshold,
            self.vertical_spacing * self.collision_threshold,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeSizeConfigFile {
    start: Option<Size>,
    entrypoint: Option<Size>,
    step: Option<Size>,
    decision: Option<Size>,
    end: Option<Size>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    horizontal_spacing: Option<f32>,
    vertical_spacing: Option<f32>,
    lane_height: Option<f32>,
    base_unit: Option<f32>,
    collision_threshold: Option<f32>,
    origin_x: Option<f32>,
    center_y: Option<f32>,
    node_sizes: Option<NodeSizeConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = LayoutConfig::default();

    if let Some(v) = parsed.horizontal_spacing {
        config.horizontal_spacing = v;
    }
    if let Some(v) = parsed.vertical_spacing {
        config.vertical_spacing = v;
    }
    if let Some(v) = parsed.lane_height {
        config.lane_height = v;
    }
    if let Some(v) = parsed.base_unit {
        config.base_unit = v;
    }
    if let Some(v) = parsed.collision_threshold {
        config.collision_threshold = v;
    }
    if let Some(v) = parsed.origin_x {
        config.origin_x = v;
    }
    if let Some(v) = parsed.center_y {
        config.center_y = v;
    }

    if let Some(sizes) = parsed.node_sizes {
        if let Some(v) = sizes.start {
            config.node_sizes.start = v;
        }
        if let Some(v) = sizes.entrypoint {
            config.node_sizes.entrypoint = v;
        }
        if let Some(v) = sizes.step {
            config.node_sizes.step = v;
        }
        if let Some(v) = sizes.decision {
            config.node_sizes.decision = v;
        }
        if let Some(v) = sizes.end {
            config.node_sizes.end = v;
        }
    }

    Ok(config)
}
