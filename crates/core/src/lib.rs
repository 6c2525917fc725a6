//! # netmap core
//!
//! Core types, traits, and error handling shared by every netmap crate.
//!
//! - **Types**: canvas geometry (`Position`, `Size`), node kinds and device types
//! - **Traits**: `Validatable` for form data checked before any remote call
//! - **Notices**: the user-visible message log (`NoticeLog`)
//! - **Errors**: unified error handling with `NetmapError` and `NetmapResult`
//!

pub mod error;
pub mod notice;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{NetmapError, NetmapResult};
pub use notice::{Notice, NoticeLevel, NoticeLog};
pub use traits::Validatable;
pub use types::{DeviceType, NodeKind, Position, Size};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
