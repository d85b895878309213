//! Ordered project collection
//!
//! The order of the collection is local presentation state: the backend
//! never learns about it and the next list replaces it wholesale.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ReorderError, ReorderResult};
use crate::models::Project;

/// Field a sorted view is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Status,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Status => "status",
        }
    }

    /// Compare two projects on this key, case-insensitively first
    fn compare(&self, a: &Project, b: &Project) -> Ordering {
        match self {
            SortKey::Name => compare_text(&a.name, &b.name),
            SortKey::Status => compare_text(a.status.as_str(), b.status.as_str()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "status" => Ok(SortKey::Status),
            other => Err(format!("Unknown sort key: {other}")),
        }
    }
}

/// Case-insensitive order; only exact duplicates compare equal
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Projects in their current display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCollection {
    projects: Vec<Project>,
}

impl ProjectCollection {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Replace every record, dropping any local order
    pub fn replace(&mut self, projects: Vec<Project>) {
        self.projects = projects;
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    /// Move the project at `from` so it ends up at `to`
    ///
    /// The project is removed and reinserted; everything between shifts by
    /// one. Both indices must be in bounds.
    pub fn reorder(&mut self, from: usize, to: usize) -> ReorderResult<()> {
        let len = self.projects.len();
        if from >= len || to >= len {
            return Err(ReorderError::OutOfBounds { from, to, len });
        }

        let project = self.projects.remove(from);
        self.projects.insert(to, project);
        Ok(())
    }

    /// Move project `active_id` to the position held by `over_id`
    ///
    /// Positions are looked up in the raw order, so a drag made on a
    /// sorted view still moves the same records here.
    pub fn move_project(&mut self, active_id: i64, over_id: i64) -> ReorderResult<()> {
        if active_id == over_id {
            return Ok(());
        }

        let from = self
            .position(active_id)
            .ok_or(ReorderError::UnknownProject(active_id))?;
        let to = self
            .position(over_id)
            .ok_or(ReorderError::UnknownProject(over_id))?;
        self.reorder(from, to)
    }

    /// Projects sorted on `key`; ties keep their current order
    pub fn sorted_view(&self, key: SortKey) -> Vec<&Project> {
        let mut view: Vec<&Project> = self.projects.iter().collect();
        view.sort_by(|a, b| key.compare(a, b));
        view
    }
}
