//! Profile model and related payloads

use chrono::NaiveDate;
use common::de::null_as_default;
use common::error::{ClientError, ClientResult};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

/// Profile of the signed-in user
///
/// `username`, `email` and `role` are owned by the backend and never sent
/// back in an update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub telegram_notifications_enabled: bool,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Profile {
    /// Whether a non-empty telegram id is set
    pub fn has_telegram_id(&self) -> bool {
        self.telegram_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

/// Profile update payload
///
/// Only the mutable fields exist here, so identity fields and the avatar
/// cannot leak into a `PUT users/profile/`. Unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileUpdate {
    /// Seed an edit form with every mutable field of `profile`
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            first_name: Some(profile.first_name.clone().unwrap_or_default()),
            last_name: Some(profile.last_name.clone().unwrap_or_default()),
            telegram_id: Some(profile.telegram_id.clone().unwrap_or_default()),
            telegram_notifications_enabled: Some(profile.telegram_notifications_enabled),
            phone_number: Some(profile.phone_number.clone().unwrap_or_default()),
            date_of_birth: profile.date_of_birth,
        }
    }
}

/// A selected avatar image
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Multipart form with the image under the `avatar` part
    pub fn into_form(self) -> ClientResult<Form> {
        let mut part = Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(content_type) = self.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ClientError::InvalidRequest(format!("{content_type}: {e}")))?;
        }
        Ok(Form::new().part("avatar", part))
    }
}

/// Response of `PUT users/profile/avatar/`
///
/// The backend wraps the new reference in `data`; a bare object is
/// accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AvatarResponse {
    Wrapped { data: AvatarBody },
    Bare(AvatarBody),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarBody {
    #[serde(default)]
    pub avatar: Option<String>,
}

impl AvatarResponse {
    pub fn avatar(self) -> Option<String> {
        match self {
            AvatarResponse::Wrapped { data } | AvatarResponse::Bare(data) => data.avatar,
        }
    }
}
