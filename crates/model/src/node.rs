//! Canvas nodes and edges
//!
//! A node is a device or a group placed on the canvas; an edge is a
//! connection between two nodes. Both carry a prefixed `ElementId` and a
//! `synced` flag recording whether that id is remote-rooted yet.

use crate::device::{DeviceData, GroupData};
use crate::ids::ElementId;
use netmap_core::{NetmapResult, NodeKind, Position, Size, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// NodeData
// ============================================================================

/// Entity data carried by a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum NodeData {
    Device(DeviceData),
    Group(GroupData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Device(_) => NodeKind::Device,
            NodeData::Group(_) => NodeKind::Group,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeData::Device(d) => &d.name,
            NodeData::Group(g) => &g.name,
        }
    }

    pub fn as_device(&self) -> Option<&DeviceData> {
        match self {
            NodeData::Device(d) => Some(d),
            NodeData::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupData> {
        match self {
            NodeData::Group(g) => Some(g),
            NodeData::Device(_) => None,
        }
    }
}

impl Validatable for NodeData {
    fn validate(&self) -> NetmapResult<()> {
        match self {
            NodeData::Device(d) => d.validate(),
            NodeData::Group(g) => g.validate(),
        }
    }
}

impl From<DeviceData> for NodeData {
    fn from(data: DeviceData) -> Self {
        NodeData::Device(data)
    }
}

impl From<GroupData> for NodeData {
    fn from(data: GroupData) -> Self {
        NodeData::Group(data)
    }
}

// ============================================================================
// CanvasNode
// ============================================================================

/// A node placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: ElementId,

    /// Screen position (never persisted)
    pub position: Position,

    /// Bounding box, only set for groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(flatten)]
    pub data: NodeData,

    /// Whether `id` is rooted in a store-assigned row id
    #[serde(default)]
    pub synced: bool,
}

impl CanvasNode {
    /// Create a device node
    pub fn device(id: ElementId, position: Position, data: DeviceData) -> Self {
        Self {
            id,
            position,
            size: None,
            data: NodeData::Device(data),
            synced: false,
        }
    }

    /// Create a group node with the default bounding box
    pub fn group(id: ElementId, position: Position, data: GroupData) -> Self {
        Self {
            id,
            position,
            size: Some(Size::default_group()),
            data: NodeData::Group(data),
            synced: false,
        }
    }

    /// Mark the node as carrying a remote-rooted id
    pub fn synced(mut self) -> Self {
        self.synced = true;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn name(&self) -> &str {
        self.data.name()
    }
}

// ============================================================================
// CanvasEdge
// ============================================================================

/// A connection drawn between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasEdge {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default)]
    pub synced: bool,
}

impl CanvasEdge {
    pub fn new(id: ElementId, source: ElementId, target: ElementId) -> Self {
        Self {
            id,
            source,
            target,
            synced: false,
        }
    }

    /// Mark the edge as carrying a remote-rooted id
    pub fn synced(mut self) -> Self {
        self.synced = true;
        self
    }

    /// Check if a given node is either end of this edge
    pub fn touches(&self, node_id: &ElementId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

// ============================================================================
// Tests
// ============================================================================
