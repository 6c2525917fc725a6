//! Edit Session Controller
//!
//! At most one node editor is open at a time. The open editor carries the
//! node id and the data it was opened with, which is what a form prefills.

use crate::sync::SyncLayer;
use crate::state::CanvasStore;
use netmap_core::{NetmapError, NetmapResult, NodeKind, Validatable};
use netmap_gateway::RemoteStore;
use netmap_model::{DeviceData, ElementId, GroupData, NodeData};
use serde::Serialize;
use tracing::{debug, error};

/// The single active editor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EditSession {
    #[default]
    Closed,
    EditingDevice { id: ElementId, data: DeviceData },
    EditingGroup { id: ElementId, data: GroupData },
}

impl EditSession {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditSession::Closed)
    }

    /// Node the open editor targets
    pub fn node_id(&self) -> Option<&ElementId> {
        match self {
            EditSession::Closed => None,
            EditSession::EditingDevice { id, .. } | EditSession::EditingGroup { id, .. } => {
                Some(id)
            }
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            EditSession::Closed => None,
            EditSession::EditingDevice { .. } => Some(NodeKind::Device),
            EditSession::EditingGroup { .. } => Some(NodeKind::Group),
        }
    }
}

/// Opens, saves, cancels and deletes through the single edit session
#[derive(Debug, Default)]
pub struct EditSessionController {
    session: EditSession,
}

impl EditSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Open the editor matching the node's kind, replacing any open one
    pub fn open(&mut self, node_id: &ElementId, canvas: &CanvasStore) -> NetmapResult<&EditSession> {
        let node = canvas
            .node(node_id)
            .ok_or_else(|| NetmapError::NodeNotFound(node_id.to_string()))?;

        self.session = match &node.data {
            NodeData::Device(data) => EditSession::EditingDevice {
                id: node.id.clone(),
                data: data.clone(),
            },
            NodeData::Group(data) => EditSession::EditingGroup {
                id: node.id.clone(),
                data: data.clone(),
            },
        };
        debug!("Opened {} editor for {}", node.kind(), node_id);
        Ok(&self.session)
    }

    /// Persist edited data for the open node
    ///
    /// Invalid data is refused before any remote call. Closes on success;
    /// on any failure the editor stays open so the user can retry or cancel.
    pub async fn save<S: RemoteStore>(
        &mut self,
        sync: &mut SyncLayer<S>,
        data: NodeData,
    ) -> NetmapResult<()> {
        let (Some(id), Some(kind)) = (self.session.node_id().cloned(), self.session.kind()) else {
            return Err(NetmapError::NoActiveSession);
        };
        if data.kind() != kind {
            return Err(NetmapError::SessionKindMismatch {
                open: kind.to_string(),
                received: data.kind().to_string(),
            });
        }
        if let Err(e) = data.validate() {
            sync.notices().error(e.notice_text());
            return Err(e);
        }

        match sync.update_node(&id, data).await {
            Ok(()) => {
                self.session = EditSession::Closed;
                sync.notices()
                    .success(format!("{} updated successfully", kind.display_name()));
                Ok(())
            }
            Err(e) => {
                error!("Error updating {} {}: {}", kind, id, e);
                sync.notices().error(format!("Failed to update {}: {}", kind, e));
                Err(e)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.session = EditSession::Closed;
    }

    /// Delete the open node, then close whatever the outcome
    pub async fn delete<S: RemoteStore>(&mut self, sync: &mut SyncLayer<S>) -> NetmapResult<()> {
        let id = self
            .session
            .node_id()
            .cloned()
            .ok_or(NetmapError::NoActiveSession)?;
        let result = sync.delete_node(&id).await;
        self.session = EditSession::Closed;
        result
    }

    /// Close the editor if its node is no longer on the canvas
    pub fn close_if_missing(&mut self, canvas: &CanvasStore) -> bool {
        let missing = self
            .session
            .node_id()
            .is_some_and(|id| canvas.node(id).is_none());
        if missing {
            self.session = EditSession::Closed;
        }
        missing
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use netmap_core::{DeviceType, NoticeLog};
    use netmap_gateway::{Gateway, MemoryStore, Operation, Table};
    use pretty_assertions::assert_eq;

    async fn setup() -> (SyncLayer<MemoryStore>, MemoryStore, ElementId, ElementId) {
        let store = MemoryStore::new();
        let mut sync = SyncLayer::new(Gateway::new(store.clone(), NoticeLog::new()));
        let device = sync
            .add_device(DeviceData::new("NAS", "192.168.1.50", DeviceType::Server))
            .await
            .unwrap();
        let group = sync.add_group(GroupData::new("Office")).await.unwrap();
        (sync, store, device, group)
    }

    #[tokio::test]
    async fn test_open_matches_node_kind() {
        let (sync, _store, device, group) = setup().await;
        let mut ctl = EditSessionController::new();

        ctl.open(&device, sync.canvas()).unwrap();
        assert_eq!(ctl.session().kind(), Some(NodeKind::Device));

        // Opening a group replaces the device editor.
        ctl.open(&group, sync.canvas()).unwrap();
        assert_eq!(ctl.session().kind(), Some(NodeKind::Group));
        assert_eq!(ctl.session().node_id(), Some(&group));
    }

    #[tokio::test]
    async fn test_open_unknown_node() {
        let (sync, _store, _device, _group) = setup().await;
        let mut ctl = EditSessionController::new();
        let ghost = ElementId::parse("device-ghost").unwrap();
        assert!(ctl.open(&ghost, sync.canvas()).unwrap_err().is_not_found());
        assert!(!ctl.is_open());
    }

    #[tokio::test]
    async fn test_save_touches_only_data() {
        let (mut sync, store, device, _group) = setup().await;
        let before = sync.canvas().node(&device).unwrap().clone();
        let mut ctl = EditSessionController::new();
        ctl.open(&device, sync.canvas()).unwrap();

        let edited = DeviceData::new("NAS", "192.168.1.51", DeviceType::Database)
            .with_notes("moved to rack 2");
        ctl.save(&mut sync, edited.clone().into()).await.unwrap();

        let after = sync.canvas().node(&device).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.position, before.position);
        assert_eq!(after.size, before.size);
        assert_eq!(after.data, NodeData::Device(edited));
        assert!(!ctl.is_open());
        assert_eq!(store.device_rows()[0].ip_address, "192.168.1.51");
        assert_eq!(
            sync.notices().latest().unwrap().text,
            "Device updated successfully"
        );
    }

    #[tokio::test]
    async fn test_failed_save_stays_open() {
        let (mut sync, store, _device, group) = setup().await;
        let mut ctl = EditSessionController::new();
        ctl.open(&group, sync.canvas()).unwrap();
        store.set_failing(Operation::Update, Table::Groups, true);

        let edited = GroupData::new("Lab").with_color("#ff0000");
        assert!(ctl.save(&mut sync, edited.into()).await.is_err());
        assert!(ctl.is_open());
        assert_eq!(sync.canvas().node(&group).unwrap().name(), "Office");
        let notice = sync.notices().latest().unwrap();
        assert!(notice.text.starts_with("Failed to update group"));
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_data_without_remote_call() {
        let (mut sync, store, device, group) = setup().await;
        let mut ctl = EditSessionController::new();
        let calls = store.call_count();

        ctl.open(&device, sync.canvas()).unwrap();
        let err = ctl
            .save(&mut sync, DeviceData::new("", "", DeviceType::Server).into())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(ctl.is_open());
        assert_eq!(store.call_count(), calls);
        assert_eq!(store.device_rows()[0].name, "NAS");
        assert_eq!(sync.canvas().node(&device).unwrap().name(), "NAS");
        assert_eq!(
            sync.notices().latest().unwrap().text,
            "Please enter a device name"
        );

        ctl.open(&group, sync.canvas()).unwrap();
        let err = ctl
            .save(&mut sync, GroupData::new("  ").into())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(ctl.is_open());
        assert_eq!(store.call_count(), calls);
        assert_eq!(store.group_rows()[0].name, "Office");
    }

    #[tokio::test]
    async fn test_save_requires_matching_session() {
        let (mut sync, store, device, _group) = setup().await;
        let mut ctl = EditSessionController::new();
        let calls = store.call_count();

        let err = ctl
            .save(&mut sync, GroupData::new("Lab").into())
            .await
            .unwrap_err();
        assert!(matches!(err, NetmapError::NoActiveSession));

        ctl.open(&device, sync.canvas()).unwrap();
        let err = ctl
            .save(&mut sync, GroupData::new("Lab").into())
            .await
            .unwrap_err();
        assert!(matches!(err, NetmapError::SessionKindMismatch { .. }));
        assert!(ctl.is_open());
        assert_eq!(store.call_count(), calls);
    }

    #[tokio::test]
    async fn test_cancel_closes() {
        let (sync, _store, device, _group) = setup().await;
        let mut ctl = EditSessionController::new();
        ctl.open(&device, sync.canvas()).unwrap();
        ctl.cancel();
        assert_eq!(ctl.session(), &EditSession::Closed);
    }

    #[tokio::test]
    async fn test_delete_closes_even_on_failure() {
        let (mut sync, store, device, _group) = setup().await;
        let mut ctl = EditSessionController::new();
        ctl.open(&device, sync.canvas()).unwrap();
        store.set_failing(Operation::Delete, Table::Devices, true);

        assert!(ctl.delete(&mut sync).await.is_err());
        assert!(!ctl.is_open());
        assert!(sync.canvas().node(&device).is_some());

        store.recover();
        ctl.open(&device, sync.canvas()).unwrap();
        ctl.delete(&mut sync).await.unwrap();
        assert!(!ctl.is_open());
        assert!(sync.canvas().node(&device).is_none());
    }

    #[tokio::test]
    async fn test_close_if_missing() {
        let (mut sync, _store, device, _group) = setup().await;
        let mut ctl = EditSessionController::new();
        ctl.open(&device, sync.canvas()).unwrap();
        assert!(!ctl.close_if_missing(sync.canvas()));

        sync.delete_device(&device).await.unwrap();
        assert!(ctl.close_if_missing(sync.canvas()));
        assert!(!ctl.is_open());
    }
}
