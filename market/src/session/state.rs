use serde::Serialize;

use crate::marketplace::{Identity, Profile};
use crate::routing::Access;

/// Why a signed-in user currently has no usable profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileGap {
    /// Document does not exist yet (sign-up still propagating) or was removed.
    Missing,
    /// Document exists but does not decode to a profile.
    Malformed,
    /// The profile stream failed (permission denied, backend unavailable).
    Unreadable,
}

/// One resolution of the profile stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEvent {
    Found(Profile),
    Absent(ProfileGap),
}

/// Controller-owned session state.
///
/// `Init` and `AwaitingProfile` are the loading states: nothing may be
/// routed on while the state is one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Identity stream has not emitted yet.
    Init,
    Unauthenticated,
    /// Identity known, profile stream not resolved for it yet.
    AwaitingProfile { identity: Identity },
    /// Identity known, profile stream resolved without a usable profile.
    ProfileUnavailable { identity: Identity, gap: ProfileGap },
    Authenticated { identity: Identity, profile: Profile },
}

impl SessionState {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Init | Self::AwaitingProfile { .. })
    }

    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Init | Self::Unauthenticated => None,
            Self::AwaitingProfile { identity }
            | Self::ProfileUnavailable { identity, .. }
            | Self::Authenticated { identity, .. } => Some(identity),
        }
    }

    /// The profile, only once it has been resolved for the current identity.
    pub const fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub const fn access(&self) -> Access {
        match self {
            Self::Init | Self::AwaitingProfile { .. } => Access::Loading,
            Self::Unauthenticated => Access::Anonymous,
            Self::ProfileUnavailable { .. } => Access::Unprofiled,
            Self::Authenticated { profile, .. } => Access::Role(profile.role),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Unauthenticated => "unauthenticated",
            Self::AwaitingProfile { .. } => "awaiting-profile",
            Self::ProfileUnavailable { .. } => "profile-unavailable",
            Self::Authenticated { .. } => "authenticated",
        }
    }

    /// Identity stream emission. Any previously held profile is discarded.
    pub fn on_identity(self, identity: Option<Identity>) -> Self {
        match identity {
            None => Self::Unauthenticated,
            Some(identity) => Self::AwaitingProfile { identity },
        }
    }

    /// Re-emission of the identity already held: keep the resolved profile,
    /// take the fresher identity attributes.
    pub fn refresh_identity(self, fresh: Identity) -> Self {
        match self {
            Self::AwaitingProfile { .. } => Self::AwaitingProfile { identity: fresh },
            Self::ProfileUnavailable { gap, .. } => Self::ProfileUnavailable {
                identity: fresh,
                gap,
            },
            Self::Authenticated { profile, .. } => Self::Authenticated {
                identity: fresh,
                profile,
            },
            other => other,
        }
    }

    /// The profile stream failed. A profile already resolved for this
    /// identity is kept; otherwise the identity is left without one.
    pub fn on_profile_failure(self) -> Self {
        match self {
            Self::Authenticated { .. } => self,
            other => other.on_profile(ProfileEvent::Absent(ProfileGap::Unreadable)),
        }
    }

    /// A fresh profile stream is being opened for the held identity. An
    /// unresolved gap goes back to the loading gate; a resolved profile stays.
    pub fn retry_profile(self) -> Self {
        match self {
            Self::ProfileUnavailable { identity, .. } => Self::AwaitingProfile { identity },
            other => other,
        }
    }

    /// Profile stream resolution. Ignored when no identity is held.
    pub fn on_profile(self, event: ProfileEvent) -> Self {
        let Some(identity) = self.identity().cloned() else {
            return self;
        };
        match event {
            ProfileEvent::Found(profile) => Self::Authenticated { identity, profile },
            ProfileEvent::Absent(gap) => Self::ProfileUnavailable { identity, gap },
        }
    }
}
