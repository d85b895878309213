//! Input validation utilities
//!
//! These checks run before anything is dispatched; a failure here never
//! reaches the network.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{AvatarUpload, LoginCredentials, Profile, ProfileUpdate, Registration};

/// Largest avatar the backend accepts
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Validate the login form
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), String> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err("All fields are required".to_string());
    }

    Ok(())
}

/// Validate the registration form
pub fn validate_registration(registration: &Registration) -> Result<(), String> {
    if registration.username.trim().is_empty()
        || registration.email.trim().is_empty()
        || registration.password.is_empty()
        || registration.password2.is_empty()
    {
        return Err("All fields are required".to_string());
    }

    validate_email(&registration.email)?;
    validate_password_confirmation(&registration.password, &registration.password2)
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate that a new password was typed twice the same way
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }

    Ok(())
}

/// Validate an avatar before upload
pub fn validate_avatar(upload: &AvatarUpload) -> Result<(), String> {
    if upload.is_empty() {
        return Err("Avatar file is empty".to_string());
    }

    if upload.len() > MAX_AVATAR_BYTES {
        return Err("Avatar size must be under 2MB".to_string());
    }

    Ok(())
}

/// Validate a profile update against the current profile
///
/// Telegram notifications can only be switched on when a telegram id is
/// set, either in the update or already on the profile.
pub fn validate_profile_update(
    update: &ProfileUpdate,
    current: Option<&Profile>,
) -> Result<(), String> {
    if update.telegram_notifications_enabled != Some(true) {
        return Ok(());
    }

    let has_id = match update.telegram_id.as_deref() {
        Some(id) => !id.trim().is_empty(),
        None => current.is_some_and(Profile::has_telegram_id),
    };

    if !has_id {
        return Err("Telegram notifications require a Telegram ID".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn registration() -> Registration {
        Registration {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret".to_string(),
            password2: "secret".to_string(),
        }
    }

    #[test]
    fn test_validate_login() {
        assert_ok!(validate_login(&LoginCredentials::new("alice", "secret")));
        assert_eq!(
            validate_login(&LoginCredentials::new("", "secret")).unwrap_err(),
            "All fields are required"
        );
        assert_eq!(
            validate_login(&LoginCredentials::new("alice", "")).unwrap_err(),
            "All fields are required"
        );
    }

    #[test]
    fn test_validate_registration() {
        assert_ok!(validate_registration(&registration()));

        let missing = Registration {
            email: String::new(),
            ..registration()
        };
        assert_eq!(
            validate_registration(&missing).unwrap_err(),
            "All fields are required"
        );

        let mismatch = Registration {
            password2: "different".to_string(),
            ..registration()
        };
        assert_eq!(
            validate_registration(&mismatch).unwrap_err(),
            "Passwords do not match"
        );

        let bad_email = Registration {
            email: "alice@".to_string(),
            ..registration()
        };
        assert_eq!(
            validate_registration(&bad_email).unwrap_err(),
            "Invalid email format"
        );
    }

    #[test]
    fn test_validate_avatar_size() {
        let small = AvatarUpload::new("a.png", vec![0; 1024]);
        assert_ok!(validate_avatar(&small));

        let exact = AvatarUpload::new("a.png", vec![0; MAX_AVATAR_BYTES]);
        assert_ok!(validate_avatar(&exact));

        let large = AvatarUpload::new("a.png", vec![0; MAX_AVATAR_BYTES + 1]);
        assert_eq!(
            validate_avatar(&large).unwrap_err(),
            "Avatar size must be under 2MB"
        );

        assert_err!(validate_avatar(&AvatarUpload::new("a.png", Vec::new())));
    }

    #[test]
    fn test_validate_profile_update_telegram() {
        let enable = ProfileUpdate {
            telegram_notifications_enabled: Some(true),
            ..ProfileUpdate::default()
        };
        assert_err!(validate_profile_update(&enable, None));

        let with_id = Profile {
            username: "alice".to_string(),
            telegram_id: Some("@alice".to_string()),
            ..Profile::default()
        };
        assert_ok!(validate_profile_update(&enable, Some(&with_id)));

        let cleared = ProfileUpdate {
            telegram_id: Some(String::new()),
            ..enable.clone()
        };
        assert_err!(validate_profile_update(&cleared, Some(&with_id)));

        assert_ok!(validate_profile_update(&ProfileUpdate::default(), None));
    }
}
