//! Prefixed element identifiers
//!
//! Canvas identifiers are a kind prefix (`device-`, `group-`, `edge-`)
//! followed by a root. The root is either a creation timestamp in
//! milliseconds (transient, before the store has answered) or the row id
//! the store assigned (remote-rooted). The prefix is stripped before any
//! remote call and re-added when rows are materialized.

use chrono::Utc;
use netmap_core::{NetmapError, NetmapResult, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Prefix
// ============================================================================

/// The kind prefix carried by every canvas identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    Device,
    Group,
    Edge,
}

impl IdPrefix {
    /// The literal prefix, including the trailing dash
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Device => "device-",
            IdPrefix::Group => "group-",
            IdPrefix::Edge => "edge-",
        }
    }

    /// All prefixes, in match order
    pub fn all() -> &'static [IdPrefix] {
        &[IdPrefix::Device, IdPrefix::Group, IdPrefix::Edge]
    }

    /// The node kind for node prefixes (`None` for edges)
    pub fn node_kind(&self) -> Option<NodeKind> {
        match self {
            IdPrefix::Device => Some(NodeKind::Device),
            IdPrefix::Group => Some(NodeKind::Group),
            IdPrefix::Edge => None,
        }
    }
}

impl From<NodeKind> for IdPrefix {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Device => IdPrefix::Device,
            NodeKind::Group => IdPrefix::Group,
        }
    }
}

// ============================================================================
// ElementId
// ============================================================================

/// A prefixed canvas identifier (`device-…`, `group-…`, `edge-…`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementId(String);

impl ElementId {
    /// Parse a prefixed identifier
    ///
    /// The root after the prefix must be non-empty.
    pub fn parse(raw: impl Into<String>) -> NetmapResult<Self> {
        let raw = raw.into();
        match IdPrefix::all()
            .iter()
            .find(|p| raw.starts_with(p.as_str()))
        {
            Some(p) if raw.len() > p.as_str().len() => Ok(Self(raw)),
            _ => Err(NetmapError::InvalidIdentifier(raw)),
        }
    }

    /// Build the remote-rooted identifier for a store row id
    pub fn remote(prefix: IdPrefix, row_id: &str) -> Self {
        Self(format!("{}{}", prefix.as_str(), row_id))
    }

    /// Build a transient identifier from a millisecond timestamp
    pub fn transient(prefix: IdPrefix, millis: i64) -> Self {
        Self(format!("{}{}", prefix.as_str(), millis))
    }

    pub fn prefix(&self) -> IdPrefix {
        IdPrefix::all()
            .iter()
            .copied()
            .find(|p| self.0.starts_with(p.as_str()))
            .unwrap_or(IdPrefix::Edge)
    }

    /// The identifier with its prefix stripped, as sent to the store
    pub fn root(&self) -> &str {
        &self.0[self.prefix().as_str().len()..]
    }

    /// The node kind, or `None` for edge identifiers
    pub fn node_kind(&self) -> Option<NodeKind> {
        self.prefix().node_kind()
    }

    pub fn is_device(&self) -> bool {
        self.prefix() == IdPrefix::Device
    }

    pub fn is_group(&self) -> bool {
        self.prefix() == IdPrefix::Group
    }

    pub fn is_edge(&self) -> bool {
        self.prefix() == IdPrefix::Edge
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ElementId {
    type Error = NetmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ElementId {
    type Err = NetmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Strip a `device-`/`group-`/`edge-` prefix from a raw identifier
///
/// Strings without a known prefix are returned unchanged.
pub fn strip_prefix(raw: &str) -> &str {
    IdPrefix::all()
        .iter()
        .find_map(|p| raw.strip_prefix(p.as_str()))
        .unwrap_or(raw)
}

// ============================================================================
// Transient Id Generator
// ============================================================================

/// Generates transient identifiers from the wall clock
///
/// Roots are millisecond timestamps, bumped by one whenever two ids are
/// requested within the same tick, so ids from one generator never collide.
#[derive(Debug, Clone, Default)]
pub struct TransientIds {
    last: i64,
}

impl TransientIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next transient identifier for the given prefix
    pub fn next(&mut self, prefix: IdPrefix) -> ElementId {
        let now = Utc::now().timestamp_millis();
        self.last = if now > self.last { now } else { self.last + 1 };
        ElementId::transient(prefix, self.last)
    }
}

// ============================================================================
// Tests
// ============================================================================
