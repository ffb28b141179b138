//! Read-only graph view of a workflow definition.
//!
//! Nodes and edges loaded from the store are placed in a directed graph
//! (petgraph) keyed by node storage id, which the validator and the execution
//! engine traverse. A graph is built per operation and never mutated.

use std::collections::{HashMap, HashSet};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::{Dfs, EdgeRef},
};

use crate::{
    FilingError, Result,
    store::data::{Edge, Node},
    workflow::NodeType,
};

pub struct WorkflowGraph {
    graph: DiGraph<Node, Edge>,
    /// storage id -> graph index
    index: HashMap<String, NodeIndex>,
}

impl WorkflowGraph {
    /// Builds the graph; nodes keep their given order, which decides the "first" start node.
    pub fn build(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self> {
        let mut graph: DiGraph<Node, Edge> = DiGraph::new();
        let mut index = HashMap::new();

        for node in nodes {
            let id = node.id.clone();
            let idx = graph.add_node(node);
            index.insert(id, idx);
        }
        for edge in edges {
            let source = index.get(&edge.source).ok_or(FilingError::Fatal(format!("edge {} references missing source node {}", edge.id, edge.source)))?;
            let target = index.get(&edge.target).ok_or(FilingError::Fatal(format!("edge {} references missing target node {}", edge.id, edge.target)))?;
            graph.add_edge(*source, *target, edge);
        }

        Ok(Self {
            graph,
            index,
        })
    }

    /// Output a human-readable representation of the workflow graph
    pub fn schema(&self) -> String {
        let graph = &self.graph;
        let mut lines = Vec::new();

        lines.push("=== Workflow Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", graph.node_count(), graph.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for idx in graph.node_indices() {
            let node = &graph[idx];
            lines.push(format!("[{}] {} (type: {}, actions: {:?})", node.nid, node.label, node.node_type.as_ref(), node.available_actions));
        }
        lines.push(String::new());

        lines.push("--- Edges ---".to_string());
        for edge_ref in graph.edge_references() {
            let edge = edge_ref.weight();
            lines.push(format!(
                "{} --[{}]--> {} (priority: {}{})",
                graph[edge_ref.source()].nid,
                edge.label.as_deref().unwrap_or("*"),
                graph[edge_ref.target()].nid,
                edge.priority,
                if edge.condition.is_some() { ", conditional" } else { "" }
            ));
        }

        lines.join("\n")
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// get node by storage id
    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    /// get node by designer-facing key
    pub fn node_by_key(
        &self,
        nid: &str,
    ) -> Option<&Node> {
        self.nodes().find(|n| n.nid == nid)
    }

    pub fn nodes_of_type(
        &self,
        node_type: NodeType,
    ) -> Vec<&Node> {
        self.nodes().filter(|n| n.node_type == node_type).collect()
    }

    /// First start node in definition order.
    pub fn start_node(&self) -> Option<&Node> {
        self.nodes().find(|n| n.node_type == NodeType::Start)
    }

    /// Outgoing edges of a node, highest priority first; ties keep definition order.
    pub fn outgoing_edges(
        &self,
        id: &str,
    ) -> Vec<&Edge> {
        let Some(idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(*idx, Direction::Outgoing).collect();
        edges.sort_by(|a, b| b.weight().priority.cmp(&a.weight().priority).then(a.id().cmp(&b.id())));
        edges.into_iter().map(|e| e.weight()).collect()
    }

    pub fn incoming_count(
        &self,
        id: &str,
    ) -> usize {
        self.index.get(id).map(|idx| self.graph.edges_directed(*idx, Direction::Incoming).count()).unwrap_or(0)
    }

    pub fn outgoing_count(
        &self,
        id: &str,
    ) -> usize {
        self.index.get(id).map(|idx| self.graph.edges_directed(*idx, Direction::Outgoing).count()).unwrap_or(0)
    }

    /// Storage ids of every node reachable from `id` (including itself) by following edges forward.
    pub fn reachable_from(
        &self,
        id: &str,
    ) -> HashSet<String> {
        let mut reached = HashSet::new();
        let Some(start) = self.index.get(id) else {
            return reached;
        };
        let mut dfs = Dfs::new(&self.graph, *start);
        while let Some(idx) = dfs.next(&self.graph) {
            reached.insert(self.graph[idx].id.clone());
        }
        reached
    }
}
