//! Persistence gateway
//!
//! Wraps a [`RemoteStore`] with the contract the editor relies on:
//!
//! - **create** returns the store-assigned row id, or `None` on failure;
//!   the failure is reported as a notice and never reaches the caller
//! - **read-all** returns the rows, or an empty collection on failure
//!   (again reported, not propagated)
//! - **update** and **delete** propagate failures to the caller, which
//!   decides what to do with its optimistic state
//!
//! Each call performs exactly one remote request.

use crate::error::GatewayResult;
use crate::store::{RemoteSnapshot, RemoteStore};
use netmap_core::NoticeLog;
use netmap_model::{
    CanvasEdge, ConnectionFields, ConnectionRow, DeviceData, DeviceFields, DeviceRow, ElementId,
    GroupData, GroupFields, GroupRow, MappingFields, MappingRow,
};
use tracing::{debug, warn};

/// Persistence gateway over a remote store
#[derive(Debug, Clone)]
pub struct Gateway<S> {
    store: S,
    notices: NoticeLog,
}

impl<S: RemoteStore> Gateway<S> {
    pub fn new(store: S, notices: NoticeLog) -> Self {
        Self { store, notices }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The notice log failures are reported to
    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    /// Report a swallowed failure and turn it into `None`
    fn absorb<T>(&self, what: &str, result: GatewayResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Error {}: {}", what, e);
                self.notices.error(format!("Failed to {}: {}", what, e));
                None
            }
        }
    }

    // ========================================================================
    // Devices
    // ========================================================================

    /// Insert a device; returns the store-assigned id
    pub async fn create_device(&self, data: &DeviceData) -> Option<String> {
        let result = self.store.insert_device(&DeviceFields::from(data)).await;
        self.absorb("save device", result).map(|row| row.id)
    }

    pub async fn fetch_devices(&self) -> Vec<DeviceRow> {
        let result = self.store.list_devices().await;
        self.absorb("fetch devices", result).unwrap_or_default()
    }

    /// Overwrite the device row behind `id` with `data`
    pub async fn update_device(&self, id: &ElementId, data: &DeviceData) -> GatewayResult<()> {
        debug!("Updating device {}", id);
        self.store
            .update_device(id.root(), &DeviceFields::from(data))
            .await
            .map(|_| ())
    }

    /// Delete a device row by its unprefixed id
    pub async fn delete_device(&self, row_id: &str) -> GatewayResult<()> {
        self.store.delete_device(row_id).await
    }

    // ========================================================================
    // Groups
    // ========================================================================

    pub async fn create_group(&self, data: &GroupData) -> Option<String> {
        let result = self.store.insert_group(&GroupFields::from(data)).await;
        self.absorb("save group", result).map(|row| row.id)
    }

    pub async fn fetch_groups(&self) -> Vec<GroupRow> {
        let result = self.store.list_groups().await;
        self.absorb("fetch groups", result).unwrap_or_default()
    }

    pub async fn update_group(&self, id: &ElementId, data: &GroupData) -> GatewayResult<()> {
        debug!("Updating group {}", id);
        self.store
            .update_group(id.root(), &GroupFields::from(data))
            .await
            .map(|_| ())
    }

    pub async fn delete_group(&self, row_id: &str) -> GatewayResult<()> {
        self.store.delete_group(row_id).await
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Insert a connection with both endpoint prefixes stripped
    pub async fn create_connection(&self, edge: &CanvasEdge) -> Option<String> {
        let result = self
            .store
            .insert_connection(&ConnectionFields::from(edge))
            .await;
        self.absorb("save connection", result).map(|row| row.id)
    }

    pub async fn fetch_connections(&self) -> Vec<ConnectionRow> {
        let result = self.store.list_connections().await;
        self.absorb("fetch connections", result).unwrap_or_default()
    }

    pub async fn update_connection(&self, edge: &CanvasEdge) -> GatewayResult<()> {
        self.store
            .update_connection(edge.id.root(), &ConnectionFields::from(edge))
            .await
            .map(|_| ())
    }

    pub async fn delete_connection(&self, row_id: &str) -> GatewayResult<()> {
        self.store.delete_connection(row_id).await
    }

    // ========================================================================
    // Device-group mappings
    // ========================================================================

    /// Associate a device row with a group row (unprefixed ids)
    pub async fn create_mapping(&self, device_id: &str, group_id: &str) -> Option<String> {
        let fields = MappingFields {
            device_id: device_id.to_string(),
            group_id: group_id.to_string(),
        };
        let result = self.store.insert_mapping(&fields).await;
        self.absorb("map device to group", result).map(|row| row.id)
    }

    pub async fn fetch_mappings(&self) -> Vec<MappingRow> {
        let result = self.store.list_mappings().await;
        self.absorb("fetch device group mappings", result)
            .unwrap_or_default()
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Fetch all three topology tables concurrently
    ///
    /// Unlike the `fetch_*` calls this propagates the first failure, so a
    /// reload can tell "nothing stored" apart from "could not fetch".
    pub async fn snapshot(&self) -> GatewayResult<RemoteSnapshot> {
        let (devices, groups, connections) = tokio::try_join!(
            self.store.list_devices(),
            self.store.list_groups(),
            self.store.list_connections(),
        )?;
        Ok(RemoteSnapshot {
            devices,
            groups,
            connections,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
