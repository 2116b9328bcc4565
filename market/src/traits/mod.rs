//! Trait abstractions for the external collaborators of the session core.
//!
//! The session service, the document database, the navigation system and the
//! toast surface all live outside this crate. Each is reached through a trait
//! so the controller can be driven deterministically in tests.

pub mod navigator;
pub mod notifier;
pub mod profile;
pub mod session;

// Re-export all traits for crate-internal use.
// The public API surface is controlled by lib.rs re-exports.
pub use navigator::Navigator;
pub use notifier::{Notification, NotificationVariant, Notifier};
pub use profile::{
    document_path, DocumentSnapshot, ProfileStore, SnapshotCallback, StoreError, StoreErrorCallback,
    StoreErrorCode,
};
pub use session::{IdentityCallback, SessionStore};
