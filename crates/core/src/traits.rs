//! Core traits for netmap

use crate::error::NetmapResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for form data that must be checked before it leaves the client
///
/// A failed validation blocks submission: the caller raises a notice and
/// never reaches the remote store.
///
/// # Example
///
/// ```rust,ignore
/// use netmap_core::{NetmapError, NetmapResult, Validatable};
///
/// struct GroupForm {
///     name: String,
/// }
///
/// impl Validatable for GroupForm {
///     fn validate(&self) -> NetmapResult<()> {
///         if self.name.trim().is_empty() {
///             return Err(NetmapError::validation("Please enter a group name"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `NetmapError` describing the problem.
    fn validate(&self) -> NetmapResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
