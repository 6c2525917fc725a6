//! # netmap model
//!
//! Entity types for the network topology editor.
//!
//! ## Core Concepts
//!
//! - **Device**: a piece of hardware on the home network (router, NAS, ...)
//! - **Group**: a labelled, colored region devices are visually gathered in
//! - **Node / Edge**: a device or group placed on the canvas, and a
//!   connection drawn between two nodes
//! - **Row**: the remote table shape of each entity
//! - **ElementId**: `device-`/`group-`/`edge-` prefixed identifiers that
//!   correlate canvas elements with remote rows
//!

// Module declarations
pub mod device;
pub mod ids;
pub mod node;
pub mod rows;

// Re-export commonly used types at crate root
pub use device::{BorderStyle, DEFAULT_GROUP_COLOR, DeviceData, GroupData};
pub use ids::{ElementId, IdPrefix, TransientIds, strip_prefix};
pub use node::{CanvasEdge, CanvasNode, NodeData};
pub use rows::{
    CONNECTIONS_TABLE, ConnectionFields, ConnectionRow, DEVICES_TABLE, DeviceFields, DeviceRow,
    GROUPS_TABLE, GroupFields, GroupRow, MAPPINGS_TABLE, MappingFields, MappingRow,
};

// Re-export core types that are commonly used with the model
pub use netmap_core::{DeviceType, NetmapError, NetmapResult, NodeKind, Position, Size};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
