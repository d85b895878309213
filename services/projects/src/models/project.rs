//! Project record and form

use std::fmt;
use std::str::FromStr;

use common::de::null_as_default;
use serde::{Deserialize, Serialize};

use super::UserRef;

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "archived" => Ok(ProjectStatus::Archived),
            other => Err(format!("Unknown project status: {other}")),
        }
    }
}

/// Project as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub owner: UserRef,
    #[serde(default)]
    pub participants: Vec<UserRef>,
}

impl Project {
    /// Whether `user_id` owns this project. Only owners may edit or delete;
    /// the backend has the final say.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner.id == user_id
    }

    /// Participant usernames joined for display
    pub fn participant_names(&self) -> String {
        self.participants
            .iter()
            .map(|p| p.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Create and update payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    /// Participant user ids
    pub participants: Vec<i64>,
    pub status: ProjectStatus,
}

impl ProjectForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Seed an edit form from an existing project
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            participants: project.participants.iter().map(|p| p.id).collect(),
            status: project.status,
        }
    }

    /// Name and description are required
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Please fill out all required fields!".to_string());
        }

        Ok(())
    }
}
