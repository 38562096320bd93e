use std::fmt;

use thiserror::Error;

use crate::ir::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::From => f.write_str("from"),
            Endpoint::To => f.write_str("to"),
        }
    }
}

/// Structural problems that abort layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("connection #{index} `{endpoint}` references unknown node `{node}`")]
    UnknownNode {
        index: usize,
        endpoint: Endpoint,
        node: String,
    },
    #[error("node id `{0}` is declared more than once")]
    DuplicateNode(String),
    #[error("node `{node}` is anchored to unknown node `{anchor}`")]
    UnknownAnchor { node: String, anchor: String },
    #[error("anchor cycle detected at node `{0}`")]
    AnchorCycle(String),
}

impl LayoutError {
    /// Id of the node the error is about.
    pub fn node_id(&self) -> &str {
        match self {
            LayoutError::UnknownNode { node, .. } => node,
            LayoutError::DuplicateNode(node) => node,
            LayoutError::UnknownAnchor { anchor, .. } => anchor,
            LayoutError::AnchorCycle(node) => node,
        }
    }
}

/// Degraded input that layout works around.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutWarning {
    #[error("no START or zero in-degree node found; leveling from first node `{0}`")]
    FallbackStart(String),
    #[error("level traversal stopped after {visits} visits; the flow may contain a cycle")]
    VisitBoundExceeded { visits: usize },
    #[error("node `{0}` is unreachable from any start node; placed at level 0")]
    OrphanNode(String),
    #[error(
        "decision `{decision}` primary output #{index} to `{to}` has no magnet side; using right"
    )]
    MagnetOverflow {
        decision: String,
        to: String,
        index: usize,
    },
    #[error("label of `{from}` -> `{to}` cannot sit near side {side:?}; placing it above the source")]
    UnsupportedLabelSide { from: String, to: String, side: Side },
    #[error("nodes `{first}` and `{second}` nearly overlap (dx={dx:.1}, dy={dy:.1})")]
    NearCollision {
        first: String,
        second: String,
        dx: f32,
        dy: f32,
    },
    #[error("root node `{0}` is placed at the origin; its position hint is ignored")]
    RootHintIgnored(String),
}

/// Collects warnings for the caller and mirrors them to `tracing`.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    warnings: Vec<LayoutWarning>,
}

impl Diagnostics {
    pub(crate) fn warn(&mut self, warning: LayoutWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    #[cfg(test)]
    pub(crate) fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub(crate) fn into_warnings(self) -> Vec<LayoutWarning> {
        self.warnings
    }
}
