//! Synchronization Layer
//!
//! Combines canvas mutations with their remote calls:
//!
//! - adds and connects are optimistic: the element appears on the canvas
//!   first, then the store is asked to create it, and on success the
//!   transient id is reconciled into the remote-rooted one
//! - deletes are gated: the element leaves the canvas only after the store
//!   confirms the delete
//! - reload replaces the canvas wholesale, or leaves it untouched if any
//!   fetch fails

use crate::layout::{ADD_AREA, LOAD_AREA, scatter};
use crate::state::{CanvasSnapshot, CanvasStore};
use netmap_core::{NetmapError, NetmapResult, NodeKind, NoticeLog, Validatable};
use netmap_gateway::{Gateway, RemoteSnapshot, RemoteStore};
use netmap_model::{
    CanvasEdge, CanvasNode, DeviceData, ElementId, GroupData, IdPrefix, MappingRow, NodeData,
    TransientIds,
};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Orchestrates canvas state and the persistence gateway
pub struct SyncLayer<S> {
    gateway: Gateway<S>,
    canvas: CanvasStore,
    ids: TransientIds,
    notices: NoticeLog,
}

impl<S: RemoteStore> SyncLayer<S> {
    pub fn new(gateway: Gateway<S>) -> Self {
        let notices = gateway.notices().clone();
        Self {
            gateway,
            canvas: CanvasStore::new(),
            ids: TransientIds::new(),
            notices,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn canvas(&self) -> &CanvasStore {
        &self.canvas
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        self.canvas.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CanvasSnapshot> {
        self.canvas.subscribe()
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    /// Report a failure that blocks an operation and hand it back
    fn reject<T>(&self, err: NetmapError) -> NetmapResult<T> {
        self.notices.error(err.notice_text());
        Err(err)
    }

    // ========================================================================
    // Add
    // ========================================================================

    /// Add a device node, then persist it
    ///
    /// Returns the node's id after the call: remote-rooted when the create
    /// succeeded, still transient when it failed.
    pub async fn add_device(&mut self, data: DeviceData) -> NetmapResult<ElementId> {
        if let Err(e) = data.validate() {
            return self.reject(e);
        }

        let id = self.ids.next(IdPrefix::Device);
        self.canvas
            .add_node(CanvasNode::device(id.clone(), scatter(ADD_AREA), data.clone()))?;
        self.notices.success(format!("Added {}", data.name));

        match self.gateway.create_device(&data).await {
            Some(row_id) => Ok(self.reconcile_node(id, IdPrefix::Device, &row_id)),
            None => Ok(id),
        }
    }

    /// Add a group node, then persist it
    pub async fn add_group(&mut self, data: GroupData) -> NetmapResult<ElementId> {
        if let Err(e) = data.validate() {
            return self.reject(e);
        }

        let id = self.ids.next(IdPrefix::Group);
        self.canvas
            .add_node(CanvasNode::group(id.clone(), scatter(ADD_AREA), data.clone()))?;
        self.notices.success(format!("Added group: {}", data.name));

        match self.gateway.create_group(&data).await {
            Some(row_id) => Ok(self.reconcile_node(id, IdPrefix::Group, &row_id)),
            None => Ok(id),
        }
    }

    fn reconcile_node(&mut self, transient: ElementId, prefix: IdPrefix, row_id: &str) -> ElementId {
        let remote = ElementId::remote(prefix, row_id);
        match self.canvas.rekey_node(&transient, remote.clone()) {
            Ok(()) => remote,
            Err(e) => {
                warn!("Could not reconcile {} with row {}: {}", transient, row_id, e);
                transient
            }
        }
    }

    // ========================================================================
    // Connect
    // ========================================================================

    /// Draw a connection between two device nodes, then persist it
    ///
    /// Connections are stored against the `devices` table only, so both
    /// ends must be distinct device nodes already on the canvas.
    pub async fn connect(
        &mut self,
        source: &ElementId,
        target: &ElementId,
    ) -> NetmapResult<ElementId> {
        if let Err(e) = self.check_connection(source, target) {
            return self.reject(e);
        }

        let id = self.ids.next(IdPrefix::Edge);
        let edge = CanvasEdge::new(id.clone(), source.clone(), target.clone());
        self.canvas.add_edge(edge.clone())?;

        match self.gateway.create_connection(&edge).await {
            Some(row_id) => {
                let remote = ElementId::remote(IdPrefix::Edge, &row_id);
                match self.canvas.rekey_edge(&id, remote.clone()) {
                    Ok(()) => Ok(remote),
                    Err(e) => {
                        warn!("Could not reconcile {} with row {}: {}", id, row_id, e);
                        Ok(id)
                    }
                }
            }
            None => Ok(id),
        }
    }

    fn check_connection(&self, source: &ElementId, target: &ElementId) -> NetmapResult<()> {
        if source == target {
            return Err(NetmapError::invalid_connection(
                source.as_str(),
                target.as_str(),
                "a device cannot be connected to itself",
            ));
        }
        for end in [source, target] {
            let node = self
                .canvas
                .node(end)
                .ok_or_else(|| NetmapError::NodeNotFound(end.to_string()))?;
            if node.kind() != NodeKind::Device {
                return Err(NetmapError::invalid_connection(
                    source.as_str(),
                    target.as_str(),
                    "only devices can be connected",
                ));
            }
        }
        if self.canvas.view().are_connected(source, target) {
            return Err(NetmapError::invalid_connection(
                source.as_str(),
                target.as_str(),
                "devices are already connected",
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Edit
    // ========================================================================

    /// Persist new data for a node, then apply it on the canvas
    ///
    /// Update failures are propagated without touching the canvas.
    pub async fn update_node(&mut self, id: &ElementId, data: NodeData) -> NetmapResult<()> {
        let node = self
            .canvas
            .node(id)
            .ok_or_else(|| NetmapError::NodeNotFound(id.to_string()))?;
        if node.kind() != data.kind() {
            return Err(NetmapError::SessionKindMismatch {
                open: node.kind().to_string(),
                received: data.kind().to_string(),
            });
        }

        match &data {
            NodeData::Device(device) => self.gateway.update_device(id, device).await?,
            NodeData::Group(group) => self.gateway.update_group(id, group).await?,
        }
        self.canvas.update_node_data(id, data)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Delete a device remotely, then drop it and its edges from the canvas
    pub async fn delete_device(&mut self, id: &ElementId) -> NetmapResult<()> {
        if !id.is_device() {
            return self.reject(NetmapError::InvalidIdentifier(id.to_string()));
        }
        if let Err(e) = self.gateway.delete_device(id.root()).await {
            error!("Error deleting device {}: {}", id, e);
            return self.reject(NetmapError::with_context(
                "Failed to delete device",
                e.to_string(),
            ));
        }
        self.canvas.remove_node(id);
        self.notices.success("Device deleted successfully");
        Ok(())
    }

    /// Delete a group remotely, then drop it from the canvas
    pub async fn delete_group(&mut self, id: &ElementId) -> NetmapResult<()> {
        if !id.is_group() {
            return self.reject(NetmapError::InvalidIdentifier(id.to_string()));
        }
        if let Err(e) = self.gateway.delete_group(id.root()).await {
            error!("Error deleting group {}: {}", id, e);
            return self.reject(NetmapError::with_context(
                "Failed to delete group",
                e.to_string(),
            ));
        }
        self.canvas.remove_node(id);
        self.notices.success("Group deleted successfully");
        Ok(())
    }

    /// Delete a node of either kind
    pub async fn delete_node(&mut self, id: &ElementId) -> NetmapResult<()> {
        match id.node_kind() {
            Some(NodeKind::Device) => self.delete_device(id).await,
            Some(NodeKind::Group) => self.delete_group(id).await,
            None => self.reject(NetmapError::InvalidIdentifier(id.to_string())),
        }
    }

    /// Delete a connection remotely, then drop the edge from the canvas
    pub async fn delete_connection(&mut self, id: &ElementId) -> NetmapResult<()> {
        if !id.is_edge() {
            return self.reject(NetmapError::InvalidIdentifier(id.to_string()));
        }
        if let Err(e) = self.gateway.delete_connection(id.root()).await {
            error!("Error deleting connection {}: {}", id, e);
            return self.reject(NetmapError::with_context(
                "Failed to delete connection",
                e.to_string(),
            ));
        }
        self.canvas.remove_edge(id);
        self.notices.success("Connection deleted successfully");
        Ok(())
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Rebuild the canvas from a fresh fetch of every table
    ///
    /// The loading flag is set for the duration of the fetch and cleared
    /// whatever the outcome. On failure the previous canvas is kept.
    pub async fn load_all(&mut self) -> NetmapResult<()> {
        self.canvas.set_loading(true);
        let result = self.gateway.snapshot().await;
        self.canvas.set_loading(false);

        match result {
            Ok(snapshot) => {
                let (nodes, edges) = materialize(&snapshot);
                info!(
                    "Loaded {} node(s) and {} edge(s) from the store",
                    nodes.len(),
                    edges.len()
                );
                self.canvas.replace_all(nodes, edges);
                self.notices.success("Network data loaded successfully");
                Ok(())
            }
            Err(e) => {
                error!("Error loading network data: {}", e);
                self.notices.error("Failed to load network data");
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Mappings and modes
    // ========================================================================

    /// Record that a device belongs to a group
    pub async fn map_device_to_group(
        &mut self,
        device: &ElementId,
        group: &ElementId,
    ) -> NetmapResult<Option<String>> {
        if !device.is_device() {
            return self.reject(NetmapError::InvalidIdentifier(device.to_string()));
        }
        if !group.is_group() {
            return self.reject(NetmapError::InvalidIdentifier(group.to_string()));
        }
        let mapping = self
            .gateway
            .create_mapping(device.root(), group.root())
            .await;
        if mapping.is_some() {
            self.notices.success("Device added to group");
        }
        Ok(mapping)
    }

    /// Every stored device-group mapping, as prefixed canvas ids
    pub async fn device_group_mappings(&self) -> Vec<(ElementId, ElementId)> {
        self.gateway
            .fetch_mappings()
            .await
            .iter()
            .map(mapping_ids)
            .collect()
    }

    /// Flip connection-drawing mode
    pub fn toggle_connection_mode(&mut self) -> bool {
        self.canvas.toggle_connecting()
    }
}

fn mapping_ids(row: &MappingRow) -> (ElementId, ElementId) {
    (
        ElementId::remote(IdPrefix::Device, &row.device_id),
        ElementId::remote(IdPrefix::Group, &row.group_id),
    )
}

/// Turn fetched rows into canvas nodes (devices first) and edges
pub fn materialize(snapshot: &RemoteSnapshot) -> (Vec<CanvasNode>, Vec<CanvasEdge>) {
    let nodes = snapshot
        .devices
        .iter()
        .map(|row| row.to_node(scatter(LOAD_AREA)))
        .chain(
            snapshot
                .groups
                .iter()
                .map(|row| row.to_node(scatter(LOAD_AREA))),
        )
        .collect();
    let edges = snapshot.connections.iter().map(|row| row.to_edge()).collect();
    (nodes, edges)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use netmap_core::DeviceType;
    use netmap_gateway::{MemoryStore, Operation, Table};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn layer() -> (SyncLayer<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let gateway = Gateway::new(store.clone(), NoticeLog::new());
        (SyncLayer::new(gateway), store)
    }

    fn device(name: &str) -> DeviceData {
        DeviceData::new(name, "192.168.1.10", DeviceType::Computer)
    }

    #[tokio::test]
    async fn test_add_device_reconciles_remote_id() {
        let (mut sync, store) = layer();
        let id = sync.add_device(device("Laptop")).await.unwrap();

        let row = &store.device_rows()[0];
        assert_eq!(id.as_str(), format!("device-{}", row.id));
        let node = sync.canvas().node(&id).unwrap();
        assert!(node.synced);
        assert!(node.position.within(ADD_AREA.width, ADD_AREA.height));
        assert_eq!(sync.canvas().nodes().len(), 1);
        assert_eq!(sync.notices().latest().unwrap().text, "Added Laptop");
    }

    #[tokio::test]
    async fn test_add_device_ids_are_unique() {
        let (mut sync, _store) = layer();
        let mut ids = HashSet::new();
        for n in 0..10 {
            let id = sync.add_device(device(&format!("pc{}", n))).await.unwrap();
            assert!(id.as_str().starts_with("device-"));
            ids.insert(id);
        }
        assert_eq!(ids.len(), 10);
        assert_eq!(sync.canvas().nodes().len(), 10);
    }

    #[tokio::test]
    async fn test_add_device_keeps_transient_node_when_create_fails() {
        let (mut sync, store) = layer();
        store.set_failing(Operation::Insert, Table::Devices, true);

        let id = sync.add_device(device("Laptop")).await.unwrap();
        let node = sync.canvas().node(&id).unwrap();
        assert!(!node.synced);
        assert!(id.root().parse::<i64>().is_ok());
        assert!(sync.notices().has_errors());
    }

    #[tokio::test]
    async fn test_invalid_device_makes_no_remote_call() {
        let (mut sync, store) = layer();
        let err = sync
            .add_device(DeviceData::new("", "10.0.0.1", DeviceType::Router))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.call_count(), 0);
        assert!(sync.canvas().nodes().is_empty());
        assert_eq!(
            sync.notices().latest().unwrap().text,
            "Please enter a device name"
        );
    }

    #[tokio::test]
    async fn test_add_group_gets_bounding_box() {
        let (mut sync, store) = layer();
        let id = sync.add_group(GroupData::new("Office")).await.unwrap();
        assert!(id.is_group());
        assert_eq!(store.group_rows().len(), 1);
        let node = sync.canvas().node(&id).unwrap();
        assert_eq!(node.size, Some(netmap_core::Size::default_group()));
        assert_eq!(
            sync.notices().latest().unwrap().text,
            "Added group: Office"
        );
    }

    #[tokio::test]
    async fn test_connect_persists_with_stripped_prefixes() {
        let (mut sync, store) = layer();
        let a = sync.add_device(device("a")).await.unwrap();
        let b = sync.add_device(device("b")).await.unwrap();

        let edge_id = sync.connect(&a, &b).await.unwrap();
        let row = &store.connection_rows()[0];
        assert_eq!(row.source_id, a.root());
        assert_eq!(row.target_id, b.root());
        assert_eq!(edge_id.as_str(), format!("edge-{}", row.id));
        assert!(sync.canvas().edge(&edge_id).unwrap().synced);
    }

    #[tokio::test]
    async fn test_connect_rejects_groups_and_self_loops() {
        let (mut sync, store) = layer();
        let a = sync.add_device(device("a")).await.unwrap();
        let g = sync.add_group(GroupData::new("Office")).await.unwrap();
        let calls = store.call_count();

        assert!(sync.connect(&a, &g).await.unwrap_err().is_validation());
        assert!(sync.connect(&a, &a).await.unwrap_err().is_validation());
        let ghost = ElementId::parse("device-ghost").unwrap();
        assert!(sync.connect(&a, &ghost).await.unwrap_err().is_not_found());

        assert_eq!(store.call_count(), calls);
        assert!(sync.canvas().edges().is_empty());
    }

    #[tokio::test]
    async fn test_connect_rejects_duplicates() {
        let (mut sync, _store) = layer();
        let a = sync.add_device(device("a")).await.unwrap();
        let b = sync.add_device(device("b")).await.unwrap();
        sync.connect(&a, &b).await.unwrap();
        assert!(sync.connect(&b, &a).await.is_err());
        assert_eq!(sync.canvas().edges().len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_delete_connected_device() {
        let (mut sync, _store) = layer();
        let d1 = sync.add_device(device("D1")).await.unwrap();
        let d2 = sync.add_device(device("D2")).await.unwrap();
        sync.connect(&d1, &d2).await.unwrap();

        sync.delete_device(&d1).await.unwrap();
        let snapshot = sync.snapshot();
        assert!(snapshot.edges.is_empty());
        let ids: Vec<_> = snapshot.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![d2]);
    }

    #[tokio::test]
    async fn test_delete_device_with_two_connections() {
        let (mut sync, _store) = layer();
        let hub = sync.add_device(device("hub")).await.unwrap();
        let a = sync.add_device(device("a")).await.unwrap();
        let b = sync.add_device(device("b")).await.unwrap();
        sync.connect(&hub, &a).await.unwrap();
        sync.connect(&b, &hub).await.unwrap();
        sync.connect(&a, &b).await.unwrap();

        sync.delete_device(&hub).await.unwrap();
        let snapshot = sync.snapshot();
        assert!(!snapshot.has_node(&hub));
        assert_eq!(snapshot.edges.len(), 1);
        assert!(snapshot.edges.iter().all(|e| !e.touches(&hub)));
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_canvas_unchanged() {
        let (mut sync, store) = layer();
        let a = sync.add_device(device("a")).await.unwrap();
        let b = sync.add_device(device("b")).await.unwrap();
        sync.connect(&a, &b).await.unwrap();
        let before = sync.snapshot();

        store.set_failing(Operation::Delete, Table::Devices, true);
        assert!(sync.delete_device(&a).await.is_err());
        assert_eq!(sync.snapshot(), before);
        let notice = sync.notices().latest().unwrap();
        assert!(notice.is_error());
        assert!(notice.text.starts_with("Failed to delete device"));
    }

    #[tokio::test]
    async fn test_delete_transient_node_fails_as_stale() {
        let (mut sync, store) = layer();
        store.set_failing(Operation::Insert, Table::Devices, true);
        let id = sync.add_device(device("a")).await.unwrap();
        store.recover();

        assert!(sync.delete_device(&id).await.is_err());
        assert!(sync.canvas().node(&id).is_some());
    }

    #[tokio::test]
    async fn test_delete_group_and_connection() {
        let (mut sync, _store) = layer();
        let g = sync.add_group(GroupData::new("Office")).await.unwrap();
        let a = sync.add_device(device("a")).await.unwrap();
        let b = sync.add_device(device("b")).await.unwrap();
        let e = sync.connect(&a, &b).await.unwrap();

        sync.delete_node(&g).await.unwrap();
        sync.delete_connection(&e).await.unwrap();
        let snapshot = sync.snapshot();
        assert_eq!(snapshot.nodes.len(), 2);
        assert!(snapshot.edges.is_empty());
        assert_eq!(
            sync.notices().latest().unwrap().text,
            "Connection deleted successfully"
        );
    }

    #[tokio::test]
    async fn test_delete_rejects_wrong_kind() {
        let (mut sync, store) = layer();
        let g = sync.add_group(GroupData::new("Office")).await.unwrap();
        let calls = store.call_count();
        assert!(sync.delete_device(&g).await.is_err());
        assert!(sync.delete_connection(&g).await.is_err());
        assert_eq!(store.call_count(), calls);
    }

    #[tokio::test]
    async fn test_round_trip_create_then_reload() {
        let (mut sync, _store) = layer();
        let data = DeviceData::new("NAS", "192.168.1.50", DeviceType::Server);
        let transient_or_remote = sync.add_device(data.clone()).await.unwrap();

        sync.load_all().await.unwrap();
        let snapshot = sync.snapshot();
        assert_eq!(snapshot.nodes.len(), 1);
        let node = &snapshot.nodes[0];
        assert_eq!(node.data, NodeData::Device(data));
        assert!(node.synced);
        assert_eq!(node.id, transient_or_remote);
        assert!(node.position.within(LOAD_AREA.width, LOAD_AREA.height));
    }

    #[tokio::test]
    async fn test_reload_is_idempotent_over_entities() {
        let (mut sync, _store) = layer();
        let a = sync.add_device(device("a")).await.unwrap();
        let b = sync.add_device(device("b")).await.unwrap();
        sync.add_group(GroupData::new("Office")).await.unwrap();
        sync.connect(&a, &b).await.unwrap();

        sync.load_all().await.unwrap();
        let first = sync.snapshot();
        sync.load_all().await.unwrap();
        let second = sync.snapshot();

        let entities = |s: &CanvasSnapshot| {
            let mut nodes: Vec<_> = s.nodes.iter().map(|n| (n.id.clone(), n.data.clone())).collect();
            nodes.sort_by(|x, y| x.0.cmp(&y.0));
            let mut edges = s.edges.clone();
            edges.sort_by(|x, y| x.id.cmp(&y.id));
            (nodes, edges)
        };
        assert_eq!(entities(&first), entities(&second));
        assert_eq!(first.nodes.len(), 3);
        assert_eq!(first.edges.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_prior_state_and_clears_loading() {
        let (mut sync, store) = layer();
        sync.add_device(device("a")).await.unwrap();
        let before = sync.snapshot();

        store.set_failing(Operation::List, Table::Groups, true);
        assert!(sync.load_all().await.is_err());
        let after = sync.snapshot();
        assert_eq!(after.nodes, before.nodes);
        assert!(!after.flags.loading);
        assert_eq!(
            sync.notices().latest().unwrap().text,
            "Failed to load network data"
        );
    }

    #[tokio::test]
    async fn test_reload_sets_loading_while_fetching() {
        let (mut sync, _store) = layer();
        let mut rx = sync.subscribe();
        sync.load_all().await.unwrap();
        // The last published snapshot has loading cleared again.
        assert!(!rx.borrow_and_update().flags.loading);
        assert!(!sync.canvas().flags().loading);
    }

    #[tokio::test]
    async fn test_mappings() {
        let (mut sync, _store) = layer();
        let d = sync.add_device(device("a")).await.unwrap();
        let g = sync.add_group(GroupData::new("Office")).await.unwrap();

        assert!(sync.map_device_to_group(&d, &g).await.unwrap().is_some());
        assert_eq!(sync.device_group_mappings().await, vec![(d.clone(), g.clone())]);
        assert!(sync.map_device_to_group(&g, &d).await.is_err());
    }

    #[tokio::test]
    async fn test_toggle_connection_mode() {
        let (mut sync, _store) = layer();
        assert!(sync.toggle_connection_mode());
        assert!(sync.canvas().flags().connecting);
        assert!(!sync.toggle_connection_mode());
    }
}
