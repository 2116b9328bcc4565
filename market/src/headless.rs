//! JSON command protocol for driving a session against in-memory backends.
//!
//! `agrimarket-headless` feeds stdin lines through [`Driver::handle_line`] and
//! prints the returned responses; tests drive the same type directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::actions::{sign_in, sign_up, SignupForm};
use crate::config::MarketConfig;
use crate::marketplace::Identity;
use crate::mocks::{MockProfileStore, MockSessionStore, RecordingNavigator, RecordingNotifier};
use crate::session::SessionView;
use crate::shared_state::SharedAppState;
use crate::traits::{Notification, StoreError, StoreErrorCode};

#[derive(Debug, Serialize)]
pub struct ReadyEvent {
    pub event: &'static str,
    pub view: SessionView,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum TestCommand {
    /// Identity stream emission; `uid: null` signs everyone out.
    SetIdentity {
        uid: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
    ProfileValue {
        uid: String,
        data: serde_json::Value,
    },
    ProfileMissing {
        uid: String,
    },
    /// Fail the profile stream. `code` defaults to `permission-denied`.
    ProfileError {
        uid: String,
        message: String,
        #[serde(default)]
        code: Option<StoreErrorCode>,
    },
    Visit {
        path: String,
    },
    SignOut,
    FailSignOut {
        fail: bool,
    },
    AddAccount {
        email: String,
        password: String,
        uid: String,
    },
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        form: SignupForm,
    },
    View,
    Shutdown,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum TestResponse {
    Ok {
        view: SessionView,
        redirects: Vec<String>,
        notifications: Vec<Notification>,
    },
    Err {
        message: String,
    },
}

/// Backends plus cursors into what they have recorded, so each response
/// only reports what the command itself caused.
pub struct Driver {
    pub app: SharedAppState,
    session: MockSessionStore,
    profiles: MockProfileStore,
    navigator: RecordingNavigator,
    notifier: RecordingNotifier,
    seen_redirects: usize,
    seen_notifications: usize,
    shut_down: bool,
}

impl Driver {
    pub fn new(config: MarketConfig) -> Self {
        let session = MockSessionStore::new();
        let profiles = MockProfileStore::new();
        let navigator = RecordingNavigator::new();
        let notifier = RecordingNotifier::new();
        let app = SharedAppState::new(
            config,
            Arc::new(session.clone()),
            Arc::new(profiles.clone()),
            Arc::new(navigator.clone()),
            Arc::new(notifier.clone()),
        );
        Self {
            app,
            session,
            profiles,
            navigator,
            notifier,
            seen_redirects: 0,
            seen_notifications: 0,
            shut_down: false,
        }
    }

    /// Mount the controller and describe the initial session.
    pub fn start(&mut self, initial_path: &str) -> ReadyEvent {
        self.app.start(initial_path);
        // Redirects issued while mounting are reported with the first command.
        ReadyEvent {
            event: "Ready",
            view: self.app.controller.view(),
        }
    }

    /// Whether a `Shutdown` command has been handled.
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Parse and run one command line.
    pub async fn handle_line(&mut self, line: &str) -> TestResponse {
        let command: TestCommand = match serde_json::from_str(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("Bad command: {}", e);
                return TestResponse::Err {
                    message: format!("bad command: {e}"),
                };
            }
        };
        match self.handle(command).await {
            Ok(()) => self.respond(),
            Err(e) => TestResponse::Err {
                message: e.to_string(),
            },
        }
    }

    fn collection(&self) -> &str {
        &self.app.config.profile_collection
    }

    async fn handle(&mut self, command: TestCommand) -> anyhow::Result<()> {
        match command {
            TestCommand::SetIdentity { uid, email } => {
                let identity = uid.map(|uid| {
                    let identity = Identity::new(uid);
                    match email {
                        Some(email) => identity.with_email(email),
                        None => identity,
                    }
                });
                self.session.emit(identity);
            }
            TestCommand::ProfileValue { uid, data } => {
                self.profiles.emit_value(self.collection(), &uid, data);
            }
            TestCommand::ProfileMissing { uid } => {
                self.profiles.emit_missing(self.collection(), &uid);
            }
            TestCommand::ProfileError { uid, message, code } => {
                let code = code.unwrap_or(StoreErrorCode::PermissionDenied);
                self.profiles
                    .emit_error(self.collection(), &uid, StoreError::new(code, message));
            }
            TestCommand::Visit { path } => {
                self.app.controller.visit(&path);
            }
            TestCommand::SignOut => {
                // Failure is already surfaced as a notification.
                let _ = self.app.controller.sign_out().await;
            }
            TestCommand::FailSignOut { fail } => {
                self.session.set_fail_sign_out(fail);
            }
            TestCommand::AddAccount {
                email,
                password,
                uid,
            } => {
                self.session
                    .add_account(&email, &password, Identity::new(uid).with_email(&email));
            }
            TestCommand::SignIn { email, password } => {
                sign_in(&self.app, &email, &password).await?;
            }
            TestCommand::SignUp { form } => {
                sign_up(&self.app, &form).await?;
            }
            TestCommand::View => {}
            TestCommand::Shutdown => {
                self.app.controller.shutdown();
                self.shut_down = true;
            }
        }
        Ok(())
    }

    fn respond(&mut self) -> TestResponse {
        let redirects = self.navigator.history();
        let notifications = self.notifier.notifications();
        let response = TestResponse::Ok {
            view: self.app.controller.view(),
            redirects: redirects[self.seen_redirects.min(redirects.len())..].to_vec(),
            notifications: notifications[self.seen_notifications.min(notifications.len())..]
                .to_vec(),
        };
        self.seen_redirects = redirects.len();
        self.seen_notifications = notifications.len();
        response
    }
}
