//! Business logic for the sign-in and sign-up forms.
//!
//! Neither flow navigates. A successful sign-in or sign-up makes the identity
//! stream emit, and the session controller takes it from there.

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{SIGN_IN_FAILED_TITLE, SIGN_UP_FAILED_TITLE};
use crate::error::{MarketError, MarketResult};
use crate::marketplace::{Identity, Profile, Role};
use crate::shared_state::SharedAppState;
use crate::traits::Notification;

const MIN_NAME_LEN: usize = 2;
const MIN_PHONE_LEN: usize = 10;
const MIN_PASSWORD_LEN: usize = 6;
const MIN_REGION_LEN: usize = 2;

/// Raw sign-up form input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub district: String,
    pub state: String,
    pub role: String,
}

impl SignupForm {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> MarketResult<Role> {
        let mut problems = Vec::new();

        if self.name.trim().chars().count() < MIN_NAME_LEN {
            problems.push("Name must be at least 2 characters.");
        }
        if !is_valid_email(&self.email) {
            problems.push("Please enter a valid email.");
        }
        if self.phone_number.trim().chars().count() < MIN_PHONE_LEN {
            problems.push("Please enter a valid phone number.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            problems.push("Password must be at least 6 characters.");
        }
        if self.district.trim().chars().count() < MIN_REGION_LEN {
            problems.push("District is required.");
        }
        if self.state.trim().chars().count() < MIN_REGION_LEN {
            problems.push("State is required.");
        }
        let role = self.role.parse::<Role>().ok();
        if role.is_none() {
            problems.push("You must select a role.");
        }

        match role {
            Some(role) if problems.is_empty() => Ok(role),
            _ => Err(MarketError::Validation(problems.join(" "))),
        }
    }

    fn profile_for(&self, identity: &Identity, role: Role) -> Profile {
        Profile {
            uid: identity.uid.clone(),
            name: self.name.trim().to_string(),
            role,
            phone_number: self.phone_number.trim().to_string(),
            district: self.district.trim().to_string(),
            state: self.state.trim().to_string(),
            email: Some(self.email.trim().to_string()),
        }
    }
}

/// Loose shape check: one `@`, something before it, a dotted domain after it.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Create an account and write its profile record.
///
/// Between the two writes the identity already exists without a profile; the
/// controller treats that window as a low-privilege state.
pub async fn sign_up(state: &SharedAppState, form: &SignupForm) -> MarketResult<Profile> {
    let role = form.validate()?;

    let result = async {
        let identity = state
            .session_store
            .create_account(form.email.trim(), &form.password, form.name.trim())
            .await?;
        let profile = form.profile_for(&identity, role);
        state
            .profile_store
            .write_document(
                &state.config.profile_collection,
                &identity.uid,
                profile.to_document()?,
            )
            .await?;
        Ok::<_, MarketError>(profile)
    }
    .await;

    match result {
        Ok(profile) => {
            info!("Signed up {} as {}", profile.uid, profile.role);
            Ok(profile)
        }
        Err(e) => {
            warn!("Sign-up failed: {}", e);
            state
                .notifier
                .notify(Notification::destructive(SIGN_UP_FAILED_TITLE, e.to_string()));
            Err(e)
        }
    }
}

/// Authenticate with email and password.
pub async fn sign_in(state: &SharedAppState, email: &str, password: &str) -> MarketResult<Identity> {
    if !is_valid_email(email) {
        return Err(MarketError::Validation("Please enter a valid email.".into()));
    }
    if password.is_empty() {
        return Err(MarketError::Validation("Password is required.".into()));
    }

    match state.session_store.sign_in(email.trim(), password).await {
        Ok(identity) => {
            info!("Signed in {}", identity.uid);
            Ok(identity)
        }
        Err(e) => {
            warn!("Sign-in failed for {}: {}", email, e);
            state
                .notifier
                .notify(Notification::destructive(SIGN_IN_FAILED_TITLE, e.to_string()));
            Err(e)
        }
    }
}
