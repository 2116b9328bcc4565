pub mod actions;
pub mod bridge;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod routing;
pub mod session;
pub mod shared_state;
pub mod subscription;
pub mod traits;
pub mod util;

#[cfg(any(test, feature = "test-support"))]
pub mod headless;
#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use bridge::{BackendFailure, ErrorBridge, OperationKind, PermissionErrorListener, Topic};
pub use config::MarketConfig;
pub use error::{MarketError, MarketResult};
pub use marketplace::{Identity, Profile, Role};
pub use routing::{decide, Access, RouteDecision, RouteTable};
pub use session::{ProfileGap, Render, SessionController, SessionState, SessionView};
pub use shared_state::SharedAppState;
pub use subscription::Subscription;
pub use traits::{
    DocumentSnapshot, Navigator, Notification, Notifier, ProfileStore, SessionStore, StoreError,
};
