use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Start,
    Entrypoint,
    Step,
    Decision,
    End,
}

/// A side of a node's bounding box, used for connector anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Straight,
    Elbow,
}

/// Offset from an anchor, expressed in abstract spacing units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutHint {
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub offset: Option<Offset>,
    #[serde(default)]
    pub exit_side: Option<Side>,
    #[serde(default)]
    pub entry_side: Option<Side>,
}

impl LayoutHint {
    pub fn anchored(anchor: &str, x: f32, y: f32) -> Self {
        Self {
            anchor: Some(anchor.to_string()),
            offset: Some(Offset { x, y }),
            ..Self::default()
        }
    }

    /// Whether the hint places the node, as opposed to only steering connectors.
    pub fn is_positional(&self) -> bool {
        self.anchor.is_some() || self.offset.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layout_hint: Option<LayoutHint>,
    #[serde(default)]
    pub size: Option<Size>,
}

impl FlowNode {
    pub fn new(id: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            name: id.to_string(),
            layout_hint: None,
            size: None,
        }
    }

    pub fn with_hint(mut self, hint: LayoutHint) -> Self {
        self.layout_hint = Some(hint);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    pub fn anchor(&self) -> Option<&str> {
        self.layout_hint.as_ref().and_then(|hint| hint.anchor.as_deref())
    }

    pub fn has_positional_hint(&self) -> bool {
        self.layout_hint
            .as_ref()
            .map(LayoutHint::is_positional)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub secondary: bool,
    #[serde(default)]
    pub exit_side: Option<Side>,
    #[serde(default)]
    pub entry_side: Option<Side>,
    #[serde(default)]
    pub line_type: Option<LineType>,
}

impl Connection {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            condition: None,
            secondary: false,
            exit_side: None,
            entry_side: None,
            line_type: None,
        }
    }

    pub fn secondary(mut self) -> Self {
        self.secondary = true;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn is_primary(&self) -> bool {
        !self.secondary
    }

    /// Text drawn on the connector; an explicit label wins over the condition.
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref().or(self.condition.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(default)]
    pub name: Option<String>,
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Flow {
    pub fn new(nodes: Vec<FlowNode>, connections: Vec<Connection>) -> Self {
        Self {
            name: None,
            nodes,
            connections,
        }
    }
}

/// Loads a flow that is already in the node/connection model, serialized as
/// JSON or JSON5.
pub fn load_flow(input: &str) -> anyhow::Result<Flow> {
    let flow: Flow = json5::from_str(input)?;
    Ok(flow)
}
