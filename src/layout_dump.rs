use crate::ir::{Flow, LineType, NodeKind, Side};
use crate::layout::{CalculationMode, FlowLayout, LabelPlacement, StrokeStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub name: Option<String>,
    pub root: Option<String>,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub connectors: Vec<ConnectorDump>,
    pub bifurcations: Vec<BifurcationDump>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub kind: NodeKind,
    pub level: usize,
    pub lane: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub mode: CalculationMode,
    pub anchor_used: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDump {
    pub from: String,
    pub to: String,
    pub line_type: LineType,
    pub start_side: Side,
    pub end_side: Side,
    pub stroke: StrokeStyle,
    pub label_placement: LabelPlacement,
    pub label_position: Option<[f32; 2]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BifurcationDump {
    pub decision_node_id: String,
    pub upper: Vec<String>,
    pub lower: Vec<String>,
    pub convergence_node_id: Option<String>,
}

impl LayoutDump {
    pub fn from_layout(layout: &FlowLayout, flow: &Flow) -> Self {
        let nodes = flow
            .nodes
            .iter()
            .filter_map(|node| {
                let position = layout.positions.get(&node.id)?;
                Some(NodeDump {
                    id: node.id.clone(),
                    kind: node.kind,
                    level: layout.level(&node.id).unwrap_or(0),
                    lane: position.lane,
                    x: position.x,
                    y: position.y,
                    width: position.width,
                    height: position.height,
                    mode: position.mode,
                    anchor_used: position.anchor_used.clone(),
                })
            })
            .collect();

        let connectors = layout
            .connectors
            .iter()
            .map(|plan| ConnectorDump {
                from: plan.from.clone(),
                to: plan.to.clone(),
                line_type: plan.line_type,
                start_side: plan.start_side,
                end_side: plan.end_side,
                stroke: plan.stroke,
                label_placement: plan.label_placement,
                label_position: plan.label_position.map(|(x, y)| [x, y]),
            })
            .collect();

        let bifurcations = layout
            .bifurcations
            .iter()
            .map(|analysis| BifurcationDump {
                decision_node_id: analysis.decision_node_id.clone(),
                upper: analysis.upper.clone(),
                lower: analysis.lower.clone(),
                convergence_node_id: analysis.convergence_node_id.clone(),
            })
            .collect();

        LayoutDump {
            name: flow.name.clone(),
            root: layout.root.clone(),
            width: layout.width,
            height: layout.height,
            nodes,
            connectors,
            bifurcations,
            warnings: layout.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &FlowLayout,
    flow: &Flow,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, flow);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
