//! Device and device-group form data
//!
//! These are the UI-facing entity shapes: what a node carries in its `data`
//! field and what the add/edit forms submit.

use netmap_core::{DeviceType, NetmapError, NetmapResult, Validatable};
use serde::{Deserialize, Serialize};

/// Default color token for new groups
pub const DEFAULT_GROUP_COLOR: &str = "blue-400";

// ============================================================================
// DeviceData
// ============================================================================

/// Attributes of a device node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceData {
    /// Display name (e.g., "Main Router")
    pub name: String,

    /// Free-text address, not checked to be a real IP
    pub ip_address: String,

    /// Optional free-text notes
    #[serde(default)]
    pub notes: String,

    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
}

impl DeviceData {
    /// Create device data with empty notes
    pub fn new(name: impl Into<String>, ip_address: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            ip_address: ip_address.into(),
            notes: String::new(),
            device_type,
        }
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

impl Validatable for DeviceData {
    fn validate(&self) -> NetmapResult<()> {
        if self.name.trim().is_empty() {
            return Err(NetmapError::validation("Please enter a device name"));
        }
        if self.ip_address.trim().is_empty() {
            return Err(NetmapError::validation("Please enter an IP address"));
        }
        Ok(())
    }
}

// ============================================================================
// GroupData
// ============================================================================

/// Attributes of a device-group node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupData {
    pub name: String,

    /// CSS color (`#4361ee`, `rgb(…)`) or a named border token (`blue-400`)
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_GROUP_COLOR.to_string()
}

/// How a group's border should be drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorderStyle {
    /// A literal CSS color
    Css(String),
    /// A named style class (`border-<token>`)
    Class(String),
}

impl GroupData {
    /// Create group data with the default color
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: default_color(),
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Resolve the color into a border style
    pub fn border_style(&self) -> BorderStyle {
        let color = self.color.trim();
        if color.is_empty() {
            return BorderStyle::Class("border-gray-300".to_string());
        }
        let is_css = color.starts_with('#')
            || color.starts_with("rgb")
            || color.starts_with("hsl")
            || color.chars().all(|c| c.is_ascii_alphabetic());
        if is_css {
            BorderStyle::Css(color.to_string())
        } else {
            BorderStyle::Class(format!("border-{}", color))
        }
    }
}

impl Validatable for GroupData {
    fn validate(&self) -> NetmapResult<()> {
        if self.name.trim().is_empty() {
            return Err(NetmapError::validation("Please enter a group name"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
