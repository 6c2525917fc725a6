//! # netmap canvas
//!
//! The editor core of the topology editor.
//!
//! - [`CanvasStore`]: the single owner of nodes, edges and flags, publishing
//!   a [`CanvasSnapshot`] on every change
//! - [`SyncLayer`]: pairs canvas mutations with remote calls (optimistic
//!   adds and connects, gated deletes, wholesale reload)
//! - [`EditSessionController`]: the single open node editor
//! - [`NetworkEditor`]: dispatches [`Intent`]s onto the pieces above
//!

pub mod editor;
pub mod layout;
pub mod session;
pub mod state;
pub mod sync;

pub use editor::{Intent, NetworkEditor, Outcome};
pub use layout::{ADD_AREA, LOAD_AREA, scatter};
pub use session::{EditSession, EditSessionController};
pub use state::{CanvasFlags, CanvasSnapshot, CanvasStore};
pub use sync::{SyncLayer, materialize};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
