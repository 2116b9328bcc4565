//! The auth/session controller.
//!
//! Composes the identity stream and the profile document stream into one
//! [`SessionState`] and is the only place that issues auth-driven navigation.

pub mod controller;
pub mod state;

pub use controller::{Render, SessionController, SessionView};
pub use state::{ProfileEvent, ProfileGap, SessionState};
