//! Login, registration and password payloads

use serde::{Deserialize, Serialize};

use super::profile::Profile;

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response of `POST users/login/`: the access token next to the profile
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(flatten)]
    pub user: Profile,
}

/// New account payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Confirmation, checked client-side and by the backend
    pub password2: String,
}

/// Password change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

impl PasswordChange {
    /// Build the payload once the new password has been confirmed
    pub fn confirmed(
        old_password: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: &str,
    ) -> Result<Self, String> {
        let new_password = new_password.into();
        crate::validation::validate_password_confirmation(&new_password, confirm_password)?;
        Ok(Self {
            old_password: old_password.into(),
            new_password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_flattens_profile() {
        let response: LoginResponse = serde_json::from_value(serde_json::json!({
            "access": "tok1",
            "refresh": "ref1",
            "id": 9,
            "username": "alice",
            "email": "alice@example.com"
        }))
        .unwrap();

        assert_eq!(response.access, "tok1");
        assert_eq!(response.refresh.as_deref(), Some("ref1"));
        assert_eq!(response.user.username, "alice");
        assert_eq!(response.user.id, Some(9));
    }

    #[test]
    fn test_login_response_requires_access() {
        let result = serde_json::from_value::<LoginResponse>(serde_json::json!({
            "username": "alice"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_password_change_requires_confirmation() {
        assert!(PasswordChange::confirmed("old", "new-secret", "new-secret").is_ok());
        assert_eq!(
            PasswordChange::confirmed("old", "new-secret", "other").unwrap_err(),
            "Passwords do not match"
        );
    }
}
