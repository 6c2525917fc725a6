//! Remote row shapes
//!
//! Rows mirror the UI entities minus the identifier prefix, use snake-case
//! column names, and carry store-managed timestamps. The `*Fields` structs
//! are the writable columns, sent as-is for both insert and update.

use crate::device::{DeviceData, GroupData};
use crate::ids::{ElementId, IdPrefix};
use crate::node::{CanvasEdge, CanvasNode};
use chrono::{DateTime, Utc};
use netmap_core::{DeviceType, Position};
use serde::{Deserialize, Serialize};

// ============================================================================
// Table names
// ============================================================================

pub const DEVICES_TABLE: &str = "devices";
pub const GROUPS_TABLE: &str = "device_groups";
pub const CONNECTIONS_TABLE: &str = "device_connections";
pub const MAPPINGS_TABLE: &str = "device_group_mappings";

// ============================================================================
// Devices
// ============================================================================

/// A row of the `devices` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRow {
    pub id: String,
    pub name: String,
    pub ip_address: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub device_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable columns of the `devices` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFields {
    pub name: String,
    pub ip_address: String,
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub device_type: String,
}

impl From<&DeviceData> for DeviceFields {
    fn from(data: &DeviceData) -> Self {
        Self {
            name: data.name.clone(),
            ip_address: data.ip_address.clone(),
            notes: Some(data.notes.clone()),
            device_type: data.device_type.as_str().to_string(),
        }
    }
}

impl DeviceRow {
    /// UI-facing data for this row
    ///
    /// An unknown `type` token falls back to the default device type.
    pub fn to_data(&self) -> DeviceData {
        let device_type = self.device_type.parse::<DeviceType>().unwrap_or_else(|e| {
            tracing::warn!("Device {} has {}; using default", self.id, e);
            DeviceType::default()
        });
        DeviceData {
            name: self.name.clone(),
            ip_address: self.ip_address.clone(),
            notes: self.notes.clone().unwrap_or_default(),
            device_type,
        }
    }

    /// Materialize as a remote-rooted canvas node
    pub fn to_node(&self, position: Position) -> CanvasNode {
        CanvasNode::device(
            ElementId::remote(IdPrefix::Device, &self.id),
            position,
            self.to_data(),
        )
        .synced()
    }
}

// ============================================================================
// Groups
// ============================================================================

/// A row of the `device_groups` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable columns of the `device_groups` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFields {
    pub name: String,
    pub color: String,
}

impl From<&GroupData> for GroupFields {
    fn from(data: &GroupData) -> Self {
        Self {
            name: data.name.clone(),
            color: data.color.clone(),
        }
    }
}

impl GroupRow {
    pub fn to_data(&self) -> GroupData {
        GroupData {
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }

    /// Materialize as a remote-rooted group node with the default bounding box
    pub fn to_node(&self, position: Position) -> CanvasNode {
        CanvasNode::group(
            ElementId::remote(IdPrefix::Group, &self.id),
            position,
            self.to_data(),
        )
        .synced()
    }
}

// ============================================================================
// Connections
// ============================================================================

/// A row of the `device_connections` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable columns of the `device_connections` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFields {
    pub source_id: String,
    pub target_id: String,
}

impl From<&CanvasEdge> for ConnectionFields {
    fn from(edge: &CanvasEdge) -> Self {
        Self {
            source_id: edge.source.root().to_string(),
            target_id: edge.target.root().to_string(),
        }
    }
}

impl ConnectionRow {
    /// Materialize as a remote-rooted edge
    ///
    /// Both endpoints reference the `devices` table, so they are re-prefixed
    /// with `device-`.
    pub fn to_edge(&self) -> CanvasEdge {
        CanvasEdge::new(
            ElementId::remote(IdPrefix::Edge, &self.id),
            ElementId::remote(IdPrefix::Device, &self.source_id),
            ElementId::remote(IdPrefix::Device, &self.target_id),
        )
        .synced()
    }
}

// ============================================================================
// Device-group mappings
// ============================================================================

/// A row of the `device_group_mappings` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    pub id: String,
    pub device_id: String,
    pub group_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable columns of the `device_group_mappings` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFields {
    pub device_id: String,
    pub group_id: String,
}

// ============================================================================
// Tests
// ============================================================================
