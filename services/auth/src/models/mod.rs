//! Session client models

pub mod credentials;
pub mod profile;

// Re-export for convenience
pub use credentials::{LoginCredentials, LoginResponse, PasswordChange, Registration};
pub use profile::{AvatarResponse, AvatarUpload, Profile, ProfileUpdate};
