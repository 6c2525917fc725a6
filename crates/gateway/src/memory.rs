//! In-process store
//!
//! Behaves like the hosted store closely enough for offline use and tests:
//! UUID row ids, store-managed timestamps, foreign keys from connections
//! and mappings to their parent rows (deletes cascade), and `NotFound` for
//! updates/deletes that match nothing. Individual operations can be made to
//! fail, and every call is recorded.

use crate::error::{GatewayError, GatewayResult};
use crate::store::{RemoteStore, Table};
use async_trait::async_trait;
use chrono::Utc;
use netmap_model::{
    ConnectionFields, ConnectionRow, DeviceFields, DeviceRow, GroupFields, GroupRow,
    MappingFields, MappingRow,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Kind of table operation, for failure injection and the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    List,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct Tables {
    devices: Vec<DeviceRow>,
    groups: Vec<GroupRow>,
    connections: Vec<ConnectionRow>,
    mappings: Vec<MappingRow>,
    failing: HashSet<(Operation, Table)>,
    calls: Vec<(Operation, Table)>,
}

impl Tables {
    fn call(&mut self, op: Operation, table: Table) -> GatewayResult<()> {
        self.calls.push((op, table));
        if self.failing.contains(&(op, table)) {
            return Err(GatewayError::Network(format!(
                "injected failure for {:?} on {}",
                op, table
            )));
        }
        Ok(())
    }

    fn has_device(&self, id: &str) -> bool {
        self.devices.iter().any(|d| d.id == id)
    }

    fn has_group(&self, id: &str) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }
}

fn fk_violation(table: Table, column: &str, id: &str) -> GatewayError {
    GatewayError::Http(
        409,
        format!(
            "insert or update on table \"{}\" violates foreign key constraint on {} ({})",
            table, column, id
        ),
    )
}

fn new_row_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shared in-memory store; clones see the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` on `table` fail (or succeed again)
    pub fn set_failing(&self, op: Operation, table: Table, failing: bool) {
        let mut tables = self.lock();
        if failing {
            tables.failing.insert((op, table));
        } else {
            tables.failing.remove(&(op, table));
        }
    }

    /// Clear all injected failures
    pub fn recover(&self) {
        self.lock().failing.clear();
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<(Operation, Table)> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn device_rows(&self) -> Vec<DeviceRow> {
        self.lock().devices.clone()
    }

    pub fn group_rows(&self) -> Vec<GroupRow> {
        self.lock().groups.clone()
    }

    pub fn connection_rows(&self) -> Vec<ConnectionRow> {
        self.lock().connections.clone()
    }

    pub fn mapping_rows(&self) -> Vec<MappingRow> {
        self.lock().mappings.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn insert_device(&self, fields: &DeviceFields) -> GatewayResult<DeviceRow> {
        let mut tables = self.lock();
        tables.call(Operation::Insert, Table::Devices)?;
        let now = Utc::now();
        let row = DeviceRow {
            id: new_row_id(),
            name: fields.name.clone(),
            ip_address: fields.ip_address.clone(),
            notes: fields.notes.clone(),
            device_type: fields.device_type.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.devices.push(row.clone());
        Ok(row)
    }

    async fn list_devices(&self) -> GatewayResult<Vec<DeviceRow>> {
        let mut tables = self.lock();
        tables.call(Operation::List, Table::Devices)?;
        Ok(tables.devices.clone())
    }

    async fn update_device(&self, id: &str, fields: &DeviceFields) -> GatewayResult<DeviceRow> {
        let mut tables = self.lock();
        tables.call(Operation::Update, Table::Devices)?;
        let row = tables
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| GatewayError::not_found(Table::Devices.name(), id))?;
        row.name = fields.name.clone();
        row.ip_address = fields.ip_address.clone();
        row.notes = fields.notes.clone();
        row.device_type = fields.device_type.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_device(&self, id: &str) -> GatewayResult<()> {
        let mut tables = self.lock();
        tables.call(Operation::Delete, Table::Devices)?;
        if !tables.has_device(id) {
            return Err(GatewayError::not_found(Table::Devices.name(), id));
        }
        tables.devices.retain(|d| d.id != id);
        tables
            .connections
            .retain(|c| c.source_id != id && c.target_id != id);
        tables.mappings.retain(|m| m.device_id != id);
        Ok(())
    }

    async fn insert_group(&self, fields: &GroupFields) -> GatewayResult<GroupRow> {
        let mut tables = self.lock();
        tables.call(Operation::Insert, Table::Groups)?;
        let now = Utc::now();
        let row = GroupRow {
            id: new_row_id(),
            name: fields.name.clone(),
            color: fields.color.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.groups.push(row.clone());
        Ok(row)
    }

    async fn list_groups(&self) -> GatewayResult<Vec<GroupRow>> {
        let mut tables = self.lock();
        tables.call(Operation::List, Table::Groups)?;
        Ok(tables.groups.clone())
    }

    async fn update_group(&self, id: &str, fields: &GroupFields) -> GatewayResult<GroupRow> {
        let mut tables = self.lock();
        tables.call(Operation::Update, Table::Groups)?;
        let row = tables
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| GatewayError::not_found(Table::Groups.name(), id))?;
        row.name = fields.name.clone();
        row.color = fields.color.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_group(&self, id: &str) -> GatewayResult<()> {
        let mut tables = self.lock();
        tables.call(Operation::Delete, Table::Groups)?;
        if !tables.has_group(id) {
            return Err(GatewayError::not_found(Table::Groups.name(), id));
        }
        tables.groups.retain(|g| g.id != id);
        tables.mappings.retain(|m| m.group_id != id);
        Ok(())
    }

    async fn insert_connection(&self, fields: &ConnectionFields) -> GatewayResult<ConnectionRow> {
        let mut tables = self.lock();
        tables.call(Operation::Insert, Table::Connections)?;
        for id in [&fields.source_id, &fields.target_id] {
            if !tables.has_device(id) {
                return Err(fk_violation(Table::Connections, "device", id));
            }
        }
        let now = Utc::now();
        let row = ConnectionRow {
            id: new_row_id(),
            source_id: fields.source_id.clone(),
            target_id: fields.target_id.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.connections.push(row.clone());
        Ok(row)
    }

    async fn list_connections(&self) -> GatewayResult<Vec<ConnectionRow>> {
        let mut tables = self.lock();
        tables.call(Operation::List, Table::Connections)?;
        Ok(tables.connections.clone())
    }

    async fn update_connection(
        &self,
        id: &str,
        fields: &ConnectionFields,
    ) -> GatewayResult<ConnectionRow> {
        let mut tables = self.lock();
        tables.call(Operation::Update, Table::Connections)?;
        for end in [&fields.source_id, &fields.target_id] {
            if !tables.has_device(end) {
                return Err(fk_violation(Table::Connections, "device", end));
            }
        }
        let row = tables
            .connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GatewayError::not_found(Table::Connections.name(), id))?;
        row.source_id = fields.source_id.clone();
        row.target_id = fields.target_id.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_connection(&self, id: &str) -> GatewayResult<()> {
        let mut tables = self.lock();
        tables.call(Operation::Delete, Table::Connections)?;
        let before = tables.connections.len();
        tables.connections.retain(|c| c.id != id);
        if tables.connections.len() == before {
            return Err(GatewayError::not_found(Table::Connections.name(), id));
        }
        Ok(())
    }

    async fn insert_mapping(&self, fields: &MappingFields) -> GatewayResult<MappingRow> {
        let mut tables = self.lock();
        tables.call(Operation::Insert, Table::Mappings)?;
        if !tables.has_device(&fields.device_id) {
            return Err(fk_violation(Table::Mappings, "device_id", &fields.device_id));
        }
        if !tables.has_group(&fields.group_id) {
            return Err(fk_violation(Table::Mappings, "group_id", &fields.group_id));
        }
        let now = Utc::now();
        let row = MappingRow {
            id: new_row_id(),
            device_id: fields.device_id.clone(),
            group_id: fields.group_id.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.mappings.push(row.clone());
        Ok(row)
    }

    async fn list_mappings(&self) -> GatewayResult<Vec<MappingRow>> {
        let mut tables = self.lock();
        tables.call(Operation::List, Table::Mappings)?;
        Ok(tables.mappings.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn nas() -> DeviceFields {
        DeviceFields {
            name: "NAS".to_string(),
            ip_address: "192.168.1.50".to_string(),
            notes: Some(String::new()),
            device_type: "server".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_timestamps() {
        let store = MemoryStore::new();
        let a = store.insert_device(&nas()).await.unwrap();
        let b = store.insert_device(&nas()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.list_devices().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let err = store.update_device("1700000000000", &nas()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
        let err = store.delete_group("nope").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_connection_foreign_keys() {
        let store = MemoryStore::new();
        let a = store.insert_device(&nas()).await.unwrap();
        let err = store
            .insert_connection(&ConnectionFields {
                source_id: a.id.clone(),
                target_id: "missing".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn test_device_delete_cascades() {
        let store = MemoryStore::new();
        let a = store.insert_device(&nas()).await.unwrap();
        let b = store.insert_device(&nas()).await.unwrap();
        let g = store
            .insert_group(&GroupFields {
                name: "Office".to_string(),
                color: "blue-400".to_string(),
            })
            .await
            .unwrap();
        store
            .insert_connection(&ConnectionFields {
                source_id: a.id.clone(),
                target_id: b.id.clone(),
            })
            .await
            .unwrap();
        store
            .insert_mapping(&MappingFields {
                device_id: a.id.clone(),
                group_id: g.id.clone(),
            })
            .await
            .unwrap();

        store.delete_device(&a.id).await.unwrap();
        assert!(store.connection_rows().is_empty());
        assert!(store.mapping_rows().is_empty());
        assert_eq!(store.device_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection_and_call_log() {
        let store = MemoryStore::new();
        store.set_failing(Operation::List, Table::Groups, true);
        assert!(store.list_groups().await.is_err());
        assert!(store.list_devices().await.is_ok());

        store.recover();
        assert!(store.list_groups().await.is_ok());
        assert_eq!(
            store.calls(),
            vec![
                (Operation::List, Table::Groups),
                (Operation::List, Table::Devices),
                (Operation::List, Table::Groups),
            ]
        );
    }
}
