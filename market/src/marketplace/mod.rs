pub mod identity;
pub mod profile;

pub use identity::Identity;
pub use profile::{Profile, Role};
