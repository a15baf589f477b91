//! Host platform collaborators.
//!
//! Everything the approval core needs from the platform (file tree, user
//! directory, circles, tag storage) is passed in through these traits.

pub mod circles;
pub mod memory;

pub use circles::*;
pub use memory::*;

use crate::error::ResolveError;

/// Maps file ids to their current path.
pub trait FileResolver: Send + Sync {
    /// Fails with `ResolveError::NotFound` when the file no longer exists.
    fn resolve_by_id(&self, file_id: i64) -> Result<String, ResolveError>;
}

pub trait IdentityResolver: Send + Sync {
    /// Display name of a user, `None` for unknown users.
    fn display_name_for_user(&self, user_id: &str) -> Option<String>;
}

/// Circle directory. Lookups must happen inside a privileged session, see
/// `CircleSession`.
pub trait MembershipResolver: Send + Sync {
    fn start_session(&self);

    fn stop_session(&self);

    /// Fails with `ResolveError::NotFound` for deleted circles.
    fn display_name_for_circle(&self, circle_id: &str) -> Result<String, ResolveError>;
}

/// System tag storage.
pub trait TagStore: Send + Sync {
    /// Create a tag and return its id. Fails with
    /// `ResolveError::AlreadyExists` when the name is taken.
    fn create_tag(&self, name: &str) -> Result<i64, ResolveError>;

    fn tag_exists(&self, tag_id: i64) -> bool;
}
