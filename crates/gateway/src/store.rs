//! The remote store seam
//!
//! `RemoteStore` is one request/response call per table operation. Every
//! method returns the raw outcome; deciding which failures are swallowed
//! and which are propagated is the job of [`crate::Gateway`].

use crate::error::GatewayResult;
use async_trait::async_trait;
use netmap_model::{
    CONNECTIONS_TABLE, ConnectionFields, ConnectionRow, DEVICES_TABLE, DeviceFields, DeviceRow,
    GROUPS_TABLE, GroupFields, GroupRow, MAPPINGS_TABLE, MappingFields, MappingRow,
};
use std::fmt;

/// The four persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Devices,
    Groups,
    Connections,
    Mappings,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Devices => DEVICES_TABLE,
            Table::Groups => GROUPS_TABLE,
            Table::Connections => CONNECTIONS_TABLE,
            Table::Mappings => MAPPINGS_TABLE,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A remote tabular store holding the topology
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // Devices
    async fn insert_device(&self, fields: &DeviceFields) -> GatewayResult<DeviceRow>;
    async fn list_devices(&self) -> GatewayResult<Vec<DeviceRow>>;
    async fn update_device(&self, id: &str, fields: &DeviceFields) -> GatewayResult<DeviceRow>;
    async fn delete_device(&self, id: &str) -> GatewayResult<()>;

    // Groups
    async fn insert_group(&self, fields: &GroupFields) -> GatewayResult<GroupRow>;
    async fn list_groups(&self) -> GatewayResult<Vec<GroupRow>>;
    async fn update_group(&self, id: &str, fields: &GroupFields) -> GatewayResult<GroupRow>;
    async fn delete_group(&self, id: &str) -> GatewayResult<()>;

    // Connections
    async fn insert_connection(&self, fields: &ConnectionFields) -> GatewayResult<ConnectionRow>;
    async fn list_connections(&self) -> GatewayResult<Vec<ConnectionRow>>;
    async fn update_connection(
        &self,
        id: &str,
        fields: &ConnectionFields,
    ) -> GatewayResult<ConnectionRow>;
    async fn delete_connection(&self, id: &str) -> GatewayResult<()>;

    // Device-group mappings (write/read only)
    async fn insert_mapping(&self, fields: &MappingFields) -> GatewayResult<MappingRow>;
    async fn list_mappings(&self) -> GatewayResult<Vec<MappingRow>>;
}

/// Every row needed to rebuild the canvas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    pub devices: Vec<DeviceRow>,
    pub groups: Vec<GroupRow>,
    pub connections: Vec<ConnectionRow>,
}

impl RemoteSnapshot {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.groups.is_empty() && self.connections.is_empty()
    }
}
