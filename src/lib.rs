#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::LayoutConfig;
pub use ir::{Connection, Flow, FlowNode, LayoutHint, LineType, NodeKind, Side, load_flow};
pub use layout::{
    ConnectorPlan, FlowLayout, LayoutError, LayoutWarning, Position, compute_layout, index_graph,
};
