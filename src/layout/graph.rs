use std::collections::{BTreeMap, HashMap};

use crate::ir::{Connection, Flow, FlowNode};

use super::error::{Endpoint, LayoutError};

/// Adjacency and primary in-degree of a flow, keyed by node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphIndex {
    pub adjacency: BTreeMap<String, Vec<String>>,
    pub in_degree: BTreeMap<String, usize>,
}

/// Builds the [`GraphIndex`] of a flow, failing on unresolvable connections.
pub fn index_graph(flow: &Flow) -> Result<GraphIndex, LayoutError> {
    let graph = FlowGraph::build(flow)?;
    Ok(GraphIndex {
        adjacency: graph.adjacency(),
        in_degree: graph.in_degree_map(),
    })
}

/// Index over a flow: node lookup, adjacency and in-degree.
///
/// Nodes are addressed by their position in `flow.nodes` and connections by
/// their position in `flow.connections`. Only primary connections feed the
/// adjacency list and in-degree; the per-node connection lists keep every
/// connection in input order.
#[derive(Debug)]
pub(crate) struct FlowGraph<'a> {
    flow: &'a Flow,
    index: HashMap<&'a str, usize>,
    endpoints: Vec<(usize, usize)>,
    targets: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<'a> FlowGraph<'a> {
    pub(crate) fn build(flow: &'a Flow) -> Result<Self, LayoutError> {
        let node_count = flow.nodes.len();
        let mut index = HashMap::with_capacity(node_count);
        for (idx, node) in flow.nodes.iter().enumerate() {
            if index.insert(node.id.as_str(), idx).is_some() {
                return Err(LayoutError::DuplicateNode(node.id.clone()));
            }
        }

        let mut endpoints = Vec::with_capacity(flow.connections.len());
        let mut targets = vec![Vec::new(); node_count];
        let mut in_degree = vec![0usize; node_count];
        let mut outgoing = vec![Vec::new(); node_count];
        let mut incoming = vec![Vec::new(); node_count];

        for (conn_idx, conn) in flow.connections.iter().enumerate() {
            let from = resolve(&index, conn_idx, Endpoint::From, &conn.from)?;
            let to = resolve(&index, conn_idx, Endpoint::To, &conn.to)?;
            endpoints.push((from, to));
            outgoing[from].push(conn_idx);
            incoming[to].push(conn_idx);
            if conn.is_primary() {
                targets[from].push(to);
                in_degree[to] += 1;
            }
        }

        Ok(Self {
            flow,
            index,
            endpoints,
            targets,
            in_degree,
            outgoing,
            incoming,
        })
    }

    pub(crate) fn flow(&self) -> &'a Flow {
        self.flow
    }

    pub(crate) fn node_count(&self) -> usize {
        self.flow.nodes.len()
    }

    pub(crate) fn node(&self, idx: usize) -> &'a FlowNode {
        &self.flow.nodes[idx]
    }

    pub(crate) fn id(&self, idx: usize) -> &'a str {
        self.flow.nodes[idx].id.as_str()
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn connection(&self, conn_idx: usize) -> &'a Connection {
        &self.flow.connections[conn_idx]
    }

    /// Resolved `(from, to)` node indices of a connection.
    pub(crate) fn endpoints(&self, conn_idx: usize) -> (usize, usize) {
        self.endpoints[conn_idx]
    }

    /// Targets of primary connections leaving `idx`, in input order.
    pub(crate) fn targets(&self, idx: usize) -> &[usize] {
        &self.targets[idx]
    }

    /// Number of primary connections entering `idx`.
    pub(crate) fn in_degree(&self, idx: usize) -> usize {
        self.in_degree[idx]
    }

    /// Number of connections of any kind entering `idx`.
    pub(crate) fn incoming_total(&self, idx: usize) -> usize {
        self.incoming[idx].len()
    }

    pub(crate) fn incoming(&self, idx: usize) -> &[usize] {
        &self.incoming[idx]
    }

    pub(crate) fn primary_outgoing(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.outgoing[idx]
            .iter()
            .copied()
            .filter(|&conn_idx| self.flow.connections[conn_idx].is_primary())
    }

    /// Primary adjacency keyed by node id. Every node has an entry.
    pub(crate) fn adjacency(&self) -> BTreeMap<String, Vec<String>> {
        (0..self.node_count())
            .map(|idx| {
                let targets = self.targets[idx]
                    .iter()
                    .map(|&to| self.id(to).to_string())
                    .collect();
                (self.id(idx).to_string(), targets)
            })
            .collect()
    }

    pub(crate) fn in_degree_map(&self) -> BTreeMap<String, usize> {
        (0..self.node_count())
            .map(|idx| (self.id(idx).to_string(), self.in_degree[idx]))
            .collect()
    }
}

fn resolve(
    index: &HashMap<&str, usize>,
    conn_idx: usize,
    endpoint: Endpoint,
    id: &str,
) -> Result<usize, LayoutError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| LayoutError::UnknownNode {
            index: conn_idx,
            endpoint,
            node: id.to_string(),
        })
}
