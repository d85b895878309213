//! Shared session state
//!
//! The session is shared between the [`SessionStore`](crate::store::SessionStore)
//! and the gateway: the store drives it through login and profile
//! actions, the gateway clears it when the backend answers 401.

use std::sync::Arc;

use async_trait::async_trait;
use common::action::{Action, ActionStatus, Phase, Tracked};
use common::gateway::SessionInvalidator;
use common::storage::CredentialStore;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::Profile;
use crate::store::SessionAction;

/// In-memory session record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub(crate) user: Option<Profile>,
    pub(crate) status: ActionStatus,
}

impl Session {
    /// The signed-in user, if any
    pub fn user(&self) -> Option<&Profile> {
        self.user.as_ref()
    }

    pub fn status(&self) -> &ActionStatus {
        &self.status
    }

    /// Error of the last rejected session action
    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    /// Only a pending login or profile load is `Authenticating`; other
    /// actions in flight leave the state as it was. A failed login leaves
    /// the session in `Error`; any other failure without a user (such as a
    /// 401) is plain `Unauthenticated`.
    pub fn state(&self) -> SessionState {
        let action = self.status.action();
        let login = Some(SessionAction::Login.name());
        let signing_in = action == login || action == Some(SessionAction::FetchProfile.name());
        match (self.status.phase(), self.user.is_some()) {
            (Phase::Pending, _) if signing_in => SessionState::Authenticating,
            (_, true) => SessionState::Authenticated,
            (Phase::Rejected, false) if action == login => SessionState::Error,
            _ => SessionState::Unauthenticated,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.user = None;
    }
}

impl Tracked for Session {
    fn status_mut(&mut self) -> &mut ActionStatus {
        &mut self.status
    }
}

/// Coarse session state, derived from the phase and the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Error,
}

/// Cloneable handle on the session and its persisted credential
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<Mutex<Session>>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionHandle {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: Arc::new(Mutex::new(Session::default())),
            credentials,
        }
    }

    pub(crate) fn state(&self) -> &Mutex<Session> {
        &self.state
    }

    pub(crate) fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.state.lock().await.clone()
    }

    pub async fn user(&self) -> Option<Profile> {
        self.state.lock().await.user.clone()
    }

    pub async fn status(&self) -> ActionStatus {
        self.state.lock().await.status.clone()
    }

    /// The persisted access token, if one is stored and readable
    pub async fn credential(&self) -> Option<String> {
        match self.credentials.load().await {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Failed to read credential: {}", e);
                None
            }
        }
    }

    /// Drop the credential and the user
    ///
    /// Safe to call on an already signed-out session.
    pub async fn sign_out(&self) {
        if let Err(e) = self.credentials.clear().await {
            warn!("Failed to clear credential: {}", e);
        }

        let mut session = self.state.lock().await;
        if session.user.is_some() {
            info!("Signed out");
        }
        session.clear();
    }
}

#[async_trait]
impl SessionInvalidator for SessionHandle {
    async fn invalidate(&self) {
        self.sign_out().await;
    }
}
