//! Session store
//!
//! Login, registration and profile operations. Each one runs through the
//! action orchestrator against the shared [`SessionHandle`], so the
//! lifecycle and last error are always observable on the session.

use common::action::{Action, Settled, orchestrate};
use common::error::ClientError;
use common::gateway::Gateway;
use tracing::info;

use crate::models::{
    AvatarResponse, AvatarUpload, LoginCredentials, LoginResponse, PasswordChange, Profile,
    ProfileUpdate, Registration,
};
use crate::session::{Session, SessionHandle};

const LOGIN_PATH: &str = "users/login/";
const REGISTER_PATH: &str = "users/register/";
const PROFILE_PATH: &str = "users/profile/";
const CHANGE_PASSWORD_PATH: &str = "users/profile/change-password/";
const AVATAR_PATH: &str = "users/profile/avatar/";

/// Operations on the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Login,
    Register,
    Logout,
    FetchProfile,
    UpdateProfile,
    ChangePassword,
    UploadAvatar,
}

impl Action for SessionAction {
    fn name(&self) -> &'static str {
        match self {
            SessionAction::Login => "login",
            SessionAction::Register => "register",
            SessionAction::Logout => "logout",
            SessionAction::FetchProfile => "fetch_profile",
            SessionAction::UpdateProfile => "update_profile",
            SessionAction::ChangePassword => "change_password",
            SessionAction::UploadAvatar => "upload_avatar",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            SessionAction::Login => "Login failed",
            SessionAction::Register => "Registration failed",
            SessionAction::Logout => "Logout failed",
            SessionAction::FetchProfile => "Failed to load profile",
            SessionAction::UpdateProfile => "Failed to update profile",
            SessionAction::ChangePassword => "Failed to change password",
            SessionAction::UploadAvatar => "Failed to update avatar",
        }
    }
}

/// Session store backed by the request gateway
#[derive(Clone)]
pub struct SessionStore {
    gateway: Gateway,
    session: SessionHandle,
}

impl SessionStore {
    /// The gateway must have been built with `session` as its invalidator
    pub fn new(gateway: Gateway, session: SessionHandle) -> Self {
        Self { gateway, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.session.snapshot().await
    }

    /// Whether a user is loaded into the session
    pub async fn is_authenticated(&self) -> bool {
        self.session.user().await.is_some()
    }

    /// Exchange credentials for an access token and the user's profile
    ///
    /// The token is persisted before the user is set, so the profile is
    /// never visible without a stored credential.
    pub async fn login(&self, credentials: &LoginCredentials) -> Settled<Profile> {
        info!("Logging in as {}", credentials.username);

        let execute = async {
            let response: LoginResponse = self.gateway.post(LOGIN_PATH, credentials).await?;
            self.session.credentials().save(&response.access).await?;
            Ok::<_, ClientError>(response.user)
        };

        orchestrate(
            self.session.state(),
            SessionAction::Login,
            execute,
            |session, user: Profile| {
                session.user = Some(user.clone());
                user
            },
        )
        .await
    }

    /// Create an account; the session is left untouched
    pub async fn register(&self, registration: &Registration) -> Settled<serde_json::Value> {
        info!("Registering account {}", registration.username);

        orchestrate(
            self.session.state(),
            SessionAction::Register,
            self.gateway
                .post::<_, serde_json::Value>(REGISTER_PATH, registration),
            |_, body| body,
        )
        .await
    }

    /// Sign out locally; no request is made and the action always fulfils
    pub async fn logout(&self) -> Settled<()> {
        orchestrate(
            self.session.state(),
            SessionAction::Logout,
            async {
                self.session.sign_out().await;
                Ok(())
            },
            |_, ()| (),
        )
        .await
    }

    /// Load the profile of the current credential
    pub async fn fetch_profile(&self) -> Settled<Profile> {
        orchestrate(
            self.session.state(),
            SessionAction::FetchProfile,
            self.gateway.get::<Profile>(PROFILE_PATH),
            |session, user| {
                session.user = Some(user.clone());
                user
            },
        )
        .await
    }

    /// Check the persisted credential by loading the profile; sign out
    /// when the check fails
    pub async fn restore_session(&self) -> Settled<Profile> {
        let outcome = self.fetch_profile().await;
        if outcome.is_rejected() {
            info!("Stored session is no longer valid");
            let _ = self.logout().await;
        }
        outcome
    }

    /// Update the mutable profile fields
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Settled<Profile> {
        orchestrate(
            self.session.state(),
            SessionAction::UpdateProfile,
            self.gateway.put::<_, Profile>(PROFILE_PATH, update),
            |session, user| {
                session.user = Some(user.clone());
                user
            },
        )
        .await
    }

    /// Change the password; a rejection leaves the credential in place
    pub async fn change_password(&self, change: &PasswordChange) -> Settled<()> {
        orchestrate(
            self.session.state(),
            SessionAction::ChangePassword,
            self.gateway
                .post::<_, serde_json::Value>(CHANGE_PASSWORD_PATH, change),
            |_, _| (),
        )
        .await
    }

    /// Upload a new avatar; only `avatar` on the loaded user changes
    pub async fn upload_avatar(&self, upload: AvatarUpload) -> Settled<Option<String>> {
        let execute = async {
            let form = upload.into_form()?;
            let response: AvatarResponse = self.gateway.put_multipart(AVATAR_PATH, form).await?;
            Ok::<_, ClientError>(response.avatar())
        };

        orchestrate(
            self.session.state(),
            SessionAction::UploadAvatar,
            execute,
            |session, avatar: Option<String>| {
                if let Some(user) = session.user.as_mut() {
                    user.avatar = avatar.clone();
                }
                avatar
            },
        )
        .await
    }

    /// Upload a new avatar, then reload the profile
    pub async fn upload_avatar_and_refresh(&self, upload: AvatarUpload) -> Settled<Profile> {
        match self.upload_avatar(upload).await {
            Settled::Fulfilled(_) => self.fetch_profile().await,
            Settled::Rejected(message) => Settled::Rejected(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_messages() {
        assert_eq!(SessionAction::Login.fallback_message(), "Login failed");
        assert_eq!(
            SessionAction::Register.fallback_message(),
            "Registration failed"
        );
        assert_eq!(
            SessionAction::FetchProfile.fallback_message(),
            "Failed to load profile"
        );
        assert_eq!(
            SessionAction::UpdateProfile.fallback_message(),
            "Failed to update profile"
        );
        assert_eq!(
            SessionAction::ChangePassword.fallback_message(),
            "Failed to change password"
        );
        assert_eq!(
            SessionAction::UploadAvatar.fallback_message(),
            "Failed to update avatar"
        );
    }

    #[test]
    fn test_action_names_are_distinct() {
        let actions = [
            SessionAction::Login,
            SessionAction::Register,
            SessionAction::Logout,
            SessionAction::FetchProfile,
            SessionAction::UpdateProfile,
            SessionAction::ChangePassword,
            SessionAction::UploadAvatar,
        ];
        let mut names: Vec<_> = actions.iter().map(|a| a.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), actions.len());
    }
}
