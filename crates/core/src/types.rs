//! Core types used throughout netmap
//!
//! Canvas geometry plus the two small enumerations every other crate
//! agrees on: which kind of node something is, and which kind of device
//! a device node represents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Geometry Types
// ============================================================================

/// Position on the 2D canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Add an offset to this position
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Whether the position lies inside `[0, width) x [0, height)`
    pub fn within(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.x < width && self.y >= 0.0 && self.y < height
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

/// Size of a node's bounding box on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Default bounding box for group nodes
    pub fn default_group() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
        }
    }

    /// Calculate the area
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::default_group()
    }
}

// ============================================================================
// Node Kind
// ============================================================================

/// The two kinds of node that can sit on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Device,
    Group,
}

impl NodeKind {
    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Device => "Device",
            NodeKind::Group => "Group",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Device => write!(f, "device"),
            NodeKind::Group => write!(f, "group"),
        }
    }
}

// ============================================================================
// Device Type
// ============================================================================

/// The fixed set of device types a device node can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Computer,
    Server,
    Router,
    Network,
    Database,
    Wifi,
    Cable,
}

impl DeviceType {
    /// Get all device types, in form order
    pub fn all() -> &'static [DeviceType] {
        &[
            DeviceType::Computer,
            DeviceType::Server,
            DeviceType::Router,
            DeviceType::Network,
            DeviceType::Database,
            DeviceType::Wifi,
            DeviceType::Cable,
        ]
    }

    /// The token stored in the `type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Computer => "computer",
            DeviceType::Server => "server",
            DeviceType::Router => "router",
            DeviceType::Network => "network",
            DeviceType::Database => "database",
            DeviceType::Wifi => "wifi",
            DeviceType::Cable => "cable",
        }
    }

    /// Get the display name for this device type
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceType::Computer => "Computer",
            DeviceType::Server => "Server",
            DeviceType::Router => "Router",
            DeviceType::Network => "Network",
            DeviceType::Database => "Database",
            DeviceType::Wifi => "WiFi",
            DeviceType::Cable => "Cable",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown device type '{}'", s))
    }
}

// ============================================================================
// Tests
// ============================================================================
