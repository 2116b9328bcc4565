//! Mock implementations for testing.
//!
//! This module provides in-memory implementations of the collaborator traits
//! that allow driving the session controller without any backend.

pub mod navigator;
pub mod notifier;
pub mod profile;
pub mod session;

pub use navigator::RecordingNavigator;
pub use notifier::RecordingNotifier;
pub use profile::MockProfileStore;
pub use session::MockSessionStore;
