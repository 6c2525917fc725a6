//! Canvas State Store
//!
//! `CanvasStore` is the single owner of the node list, the edge list and the
//! UI-mode flags. Every change goes through a command method; consumers read
//! a cloned `CanvasSnapshot` or subscribe to a `watch` channel that receives
//! a fresh snapshot after each command.

use netmap_core::{NetmapError, NetmapResult};
use netmap_model::{CanvasEdge, CanvasNode, ElementId, NodeData};
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

// ============================================================================
// Flags
// ============================================================================

/// UI-mode flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CanvasFlags {
    /// Connection drawing is on
    pub connecting: bool,
    /// A full reload is in flight
    pub loading: bool,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Read-only copy of the canvas
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanvasSnapshot {
    pub nodes: Vec<CanvasNode>,
    pub edges: Vec<CanvasEdge>,
    pub flags: CanvasFlags,
}

impl CanvasSnapshot {
    /// Get a node by id
    pub fn node(&self, id: &ElementId) -> Option<&CanvasNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Get an edge by id
    pub fn edge(&self, id: &ElementId) -> Option<&CanvasEdge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// Check if a node exists
    pub fn has_node(&self, id: &ElementId) -> bool {
        self.node(id).is_some()
    }

    /// Edges touching a node
    pub fn edges_of<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a CanvasEdge> + 'a {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Whether an edge between the two nodes already exists (either direction)
    pub fn are_connected(&self, a: &ElementId, b: &ElementId) -> bool {
        self.edges
            .iter()
            .any(|e| (&e.source == a && &e.target == b) || (&e.source == b && &e.target == a))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Owner of the canvas state
#[derive(Debug)]
pub struct CanvasStore {
    state: CanvasSnapshot,
    tx: watch::Sender<CanvasSnapshot>,
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasStore {
    /// Create an empty canvas
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CanvasSnapshot::default());
        Self {
            state: CanvasSnapshot::default(),
            tx,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Borrow the current state
    pub fn view(&self) -> &CanvasSnapshot {
        &self.state
    }

    /// Clone the current state
    pub fn snapshot(&self) -> CanvasSnapshot {
        self.state.clone()
    }

    /// Receive a new snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<CanvasSnapshot> {
        self.tx.subscribe()
    }

    pub fn node(&self, id: &ElementId) -> Option<&CanvasNode> {
        self.state.node(id)
    }

    pub fn edge(&self, id: &ElementId) -> Option<&CanvasEdge> {
        self.state.edge(id)
    }

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.state.nodes
    }

    pub fn edges(&self) -> &[CanvasEdge] {
        &self.state.edges
    }

    pub fn flags(&self) -> CanvasFlags {
        self.state.flags
    }

    // ========================================================================
    // Commands
    // ========================================================================

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }

    /// Append a node; ids must be unique
    pub fn add_node(&mut self, node: CanvasNode) -> NetmapResult<()> {
        if self.state.has_node(&node.id) {
            return Err(NetmapError::validation(format!(
                "Node '{}' already exists",
                node.id
            )));
        }
        debug!("Canvas: add node {}", node.id);
        self.state.nodes.push(node);
        self.publish();
        Ok(())
    }

    /// Append an edge; ids must be unique and both ends must be on the canvas
    pub fn add_edge(&mut self, edge: CanvasEdge) -> NetmapResult<()> {
        if self.state.edge(&edge.id).is_some() {
            return Err(NetmapError::validation(format!(
                "Connection '{}' already exists",
                edge.id
            )));
        }
        for end in [&edge.source, &edge.target] {
            if !self.state.has_node(end) {
                return Err(NetmapError::NodeNotFound(end.to_string()));
            }
        }
        debug!("Canvas: add edge {} ({} -> {})", edge.id, edge.source, edge.target);
        self.state.edges.push(edge);
        self.publish();
        Ok(())
    }

    /// Replace only the data of a node, keeping id, position and size
    pub fn update_node_data(&mut self, id: &ElementId, data: NodeData) -> NetmapResult<()> {
        let node = self
            .state
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| NetmapError::NodeNotFound(id.to_string()))?;
        if node.kind() != data.kind() {
            return Err(NetmapError::SessionKindMismatch {
                open: node.kind().to_string(),
                received: data.kind().to_string(),
            });
        }
        node.data = data;
        self.publish();
        Ok(())
    }

    /// Remove a node and every edge touching it
    ///
    /// Returns the removed node and the number of edges dropped with it.
    pub fn remove_node(&mut self, id: &ElementId) -> Option<(CanvasNode, usize)> {
        let index = self.state.nodes.iter().position(|n| &n.id == id)?;
        let node = self.state.nodes.remove(index);
        let before = self.state.edges.len();
        self.state.edges.retain(|e| !e.touches(id));
        let dropped = before - self.state.edges.len();
        debug!("Canvas: removed node {} and {} edge(s)", id, dropped);
        self.publish();
        Some((node, dropped))
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, id: &ElementId) -> Option<CanvasEdge> {
        let index = self.state.edges.iter().position(|e| &e.id == id)?;
        let edge = self.state.edges.remove(index);
        self.publish();
        Some(edge)
    }

    /// Swap a node's transient id for its remote-rooted one
    ///
    /// Every edge referencing the old id is rewritten too.
    pub fn rekey_node(&mut self, old: &ElementId, new: ElementId) -> NetmapResult<()> {
        if old != &new && self.state.has_node(&new) {
            return Err(NetmapError::validation(format!(
                "Node '{}' already exists",
                new
            )));
        }
        let node = self
            .state
            .nodes
            .iter_mut()
            .find(|n| &n.id == old)
            .ok_or_else(|| NetmapError::NodeNotFound(old.to_string()))?;
        node.id = new.clone();
        node.synced = true;

        for edge in self.state.edges.iter_mut() {
            if &edge.source == old {
                edge.source = new.clone();
            }
            if &edge.target == old {
                edge.target = new.clone();
            }
        }
        debug!("Canvas: reconciled {} -> {}", old, new);
        self.publish();
        Ok(())
    }

    /// Swap an edge's transient id for its remote-rooted one
    pub fn rekey_edge(&mut self, old: &ElementId, new: ElementId) -> NetmapResult<()> {
        let edge = self
            .state
            .edges
            .iter_mut()
            .find(|e| &e.id == old)
            .ok_or_else(|| NetmapError::EdgeNotFound(old.to_string()))?;
        debug!("Canvas: reconciled {} -> {}", old, new);
        edge.id = new;
        edge.synced = true;
        self.publish();
        Ok(())
    }

    /// Replace all nodes and edges wholesale
    pub fn replace_all(&mut self, nodes: Vec<CanvasNode>, edges: Vec<CanvasEdge>) {
        debug!(
            "Canvas: replacing state with {} node(s), {} edge(s)",
            nodes.len(),
            edges.len()
        );
        self.state.nodes = nodes;
        self.state.edges = edges;
        self.publish();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.flags.loading = loading;
        self.publish();
    }

    /// Flip connection-drawing mode, returning the new value
    pub fn toggle_connecting(&mut self) -> bool {
        self.state.flags.connecting = !self.state.flags.connecting;
        self.publish();
        self.state.flags.connecting
    }
}

// ============================================================================
// Tests
// ============================================================================
