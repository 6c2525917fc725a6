//! Intent dispatch
//!
//! Every UI event maps onto exactly one [`Intent`]. Intents are serde-tagged
//! so a front end (or a replay script) can hand them over as JSON.

use crate::session::{EditSession, EditSessionController};
use crate::state::CanvasSnapshot;
use crate::sync::SyncLayer;
use netmap_core::{NetmapError, NetmapResult, NoticeLog};
use netmap_gateway::{Gateway, RemoteStore};
use netmap_model::{DeviceData, ElementId, GroupData, NodeData};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A user action on the topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "kebab-case")]
pub enum Intent {
    AddDevice { device: DeviceData },
    AddGroup { group: GroupData },
    Connect { source: ElementId, target: ElementId },
    OpenEdit { node: ElementId },
    SaveEdit { edit: NodeData },
    CancelEdit,
    DeleteEntity { node: ElementId },
    DeleteConnection { edge: ElementId },
    Reload,
    ToggleConnectionMode,
    MapDeviceToGroup { device: ElementId, group: ElementId },
}

impl Intent {
    /// Parse one intent per non-blank line, skipping `#` comments
    pub fn parse_lines(script: &str) -> NetmapResult<Vec<Intent>> {
        script
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| serde_json::from_str::<Intent>(line).map_err(NetmapError::from))
            .collect()
    }
}

/// What a dispatched intent produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A node or edge was placed on the canvas under this id
    Created(ElementId),
    /// The edit session changed
    Session(EditSession),
    /// A mapping row was stored (or not, if the store refused it)
    Mapped(Option<String>),
    /// Connection mode is now on or off
    ConnectionMode(bool),
    Done,
}

/// The editor core: canvas, sync and the single edit session
pub struct NetworkEditor<S> {
    sync: SyncLayer<S>,
    session: EditSessionController,
}

impl<S: RemoteStore> NetworkEditor<S> {
    pub fn new(store: S) -> Self {
        Self::with_gateway(Gateway::new(store, NoticeLog::new()))
    }

    pub fn with_gateway(gateway: Gateway<S>) -> Self {
        Self {
            sync: SyncLayer::new(gateway),
            session: EditSessionController::new(),
        }
    }

    pub fn sync(&self) -> &SyncLayer<S> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut SyncLayer<S> {
        &mut self.sync
    }

    pub fn session(&self) -> &EditSession {
        self.session.session()
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        self.sync.snapshot()
    }

    pub fn notices(&self) -> &NoticeLog {
        self.sync.notices()
    }

    /// Run one intent to completion
    pub async fn dispatch(&mut self, intent: Intent) -> NetmapResult<Outcome> {
        debug!("Dispatching {:?}", intent);
        let outcome = match intent {
            Intent::AddDevice { device } => Outcome::Created(self.sync.add_device(device).await?),
            Intent::AddGroup { group } => Outcome::Created(self.sync.add_group(group).await?),
            Intent::Connect { source, target } => {
                Outcome::Created(self.sync.connect(&source, &target).await?)
            }
            Intent::OpenEdit { node } => {
                let session = self.session.open(&node, self.sync.canvas())?;
                Outcome::Session(session.clone())
            }
            Intent::SaveEdit { edit } => {
                self.session.save(&mut self.sync, edit).await?;
                Outcome::Session(self.session.session().clone())
            }
            Intent::CancelEdit => {
                self.session.cancel();
                Outcome::Session(EditSession::Closed)
            }
            Intent::DeleteEntity { node } => {
                if self.session.session().node_id() == Some(&node) {
                    self.session.delete(&mut self.sync).await?;
                } else {
                    self.sync.delete_node(&node).await?;
                }
                Outcome::Done
            }
            Intent::DeleteConnection { edge } => {
                self.sync.delete_connection(&edge).await?;
                Outcome::Done
            }
            Intent::Reload => {
                self.sync.load_all().await?;
                self.session.close_if_missing(self.sync.canvas());
                Outcome::Done
            }
            Intent::ToggleConnectionMode => {
                Outcome::ConnectionMode(self.sync.toggle_connection_mode())
            }
            Intent::MapDeviceToGroup { device, group } => {
                Outcome::Mapped(self.sync.map_device_to_group(&device, &group).await?)
            }
        };
        self.session.close_if_missing(self.sync.canvas());
        Ok(outcome)
    }

    /// Run intents in order, stopping at the first error
    pub async fn replay(&mut self, intents: Vec<Intent>) -> NetmapResult<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(intents.len());
        for intent in intents {
            outcomes.push(self.dispatch(intent).await?);
        }
        Ok(outcomes)
    }
}

// ============================================================================
// Tests
// ============================================================================
