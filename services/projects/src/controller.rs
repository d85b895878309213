//! Project collection controller
//!
//! Mirrors the backend project list in memory. Writes are never applied
//! locally: after the backend confirms a create, update or delete, the
//! whole list is fetched again.

use std::sync::Arc;

use common::action::{Action, ActionStatus, Settled, Tracked, orchestrate};
use common::gateway::Gateway;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::collection::{ProjectCollection, SortKey};
use crate::error::ReorderResult;
use crate::models::{Page, Project, ProjectForm, UserRef};

const PROJECTS_PATH: &str = "projects/";
const USERS_PATH: &str = "users/list/";

fn project_path(id: i64) -> String {
    format!("projects/{id}/")
}

/// Operations on the project collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    ListProjects,
    ListUsers,
    CreateProject,
    UpdateProject,
    DeleteProject,
}

impl Action for ProjectAction {
    fn name(&self) -> &'static str {
        match self {
            ProjectAction::ListProjects => "list_projects",
            ProjectAction::ListUsers => "list_users",
            ProjectAction::CreateProject => "create_project",
            ProjectAction::UpdateProject => "update_project",
            ProjectAction::DeleteProject => "delete_project",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            ProjectAction::ListProjects => "Failed to load projects",
            ProjectAction::ListUsers => "Failed to load users",
            ProjectAction::CreateProject => "Failed to create project",
            ProjectAction::UpdateProject => "Failed to update project",
            ProjectAction::DeleteProject => "Failed to delete project",
        }
    }
}

/// State owned by the controller
#[derive(Debug, Default)]
struct ProjectsState {
    collection: ProjectCollection,
    /// Users available as participants
    users: Vec<UserRef>,
    sort_key: SortKey,
    status: ActionStatus,
}

impl Tracked for ProjectsState {
    fn status_mut(&mut self) -> &mut ActionStatus {
        &mut self.status
    }
}

/// Controller for the project collection
#[derive(Clone)]
pub struct ProjectController {
    gateway: Gateway,
    state: Arc<Mutex<ProjectsState>>,
}

impl ProjectController {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(ProjectsState::default())),
        }
    }

    /// Projects in their current display order
    pub async fn projects(&self) -> Vec<Project> {
        self.state.lock().await.collection.projects().to_vec()
    }

    pub async fn users(&self) -> Vec<UserRef> {
        self.state.lock().await.users.clone()
    }

    pub async fn status(&self) -> ActionStatus {
        self.state.lock().await.status.clone()
    }

    /// Fetch the project list, replacing the collection and any local
    /// reordering
    pub async fn list(&self) -> Settled<Vec<Project>> {
        orchestrate(
            &self.state,
            ProjectAction::ListProjects,
            self.gateway.get::<Page<Project>>(PROJECTS_PATH),
            |state, page| {
                info!("Loaded {} projects", page.results.len());
                state.collection.replace(page.results);
                state.collection.projects().to_vec()
            },
        )
        .await
    }

    /// Fetch the users that can be added as participants
    pub async fn list_users(&self) -> Settled<Vec<UserRef>> {
        orchestrate(
            &self.state,
            ProjectAction::ListUsers,
            self.gateway.get::<Page<UserRef>>(USERS_PATH),
            |state, page| {
                state.users = page.results;
                state.users.clone()
            },
        )
        .await
    }

    /// Create a project, then reload the list
    pub async fn create(&self, form: &ProjectForm) -> Settled<()> {
        let outcome = orchestrate(
            &self.state,
            ProjectAction::CreateProject,
            self.gateway
                .post::<_, serde_json::Value>(PROJECTS_PATH, form),
            |_, _| (),
        )
        .await;
        self.refresh_after(outcome).await
    }

    /// Update project `id`, then reload the list
    pub async fn update(&self, id: i64, form: &ProjectForm) -> Settled<()> {
        let path = project_path(id);
        let outcome = orchestrate(
            &self.state,
            ProjectAction::UpdateProject,
            self.gateway.put::<_, serde_json::Value>(&path, form),
            |_, _| (),
        )
        .await;
        self.refresh_after(outcome).await
    }

    /// Delete project `id`, then reload the list
    pub async fn delete(&self, id: i64) -> Settled<()> {
        let path = project_path(id);
        let outcome = orchestrate(
            &self.state,
            ProjectAction::DeleteProject,
            self.gateway.delete(&path),
            |_, ()| (),
        )
        .await;
        self.refresh_after(outcome).await
    }

    /// Reload after a confirmed write; the write's outcome is returned
    /// whatever the reload does
    async fn refresh_after(&self, outcome: Settled<()>) -> Settled<()> {
        if outcome.is_fulfilled() {
            let _ = self.list().await;
        }
        outcome
    }

    /// Move the project at `from` to `to`, locally only
    pub async fn reorder(&self, from: usize, to: usize) -> ReorderResult<()> {
        debug!(from, to, "Reordering projects");
        self.state.lock().await.collection.reorder(from, to)
    }

    /// Move project `active_id` onto the position of `over_id`, locally only
    pub async fn move_project(&self, active_id: i64, over_id: i64) -> ReorderResult<()> {
        debug!(active_id, over_id, "Moving project");
        self.state
            .lock()
            .await
            .collection
            .move_project(active_id, over_id)
    }

    pub async fn set_sort_key(&self, key: SortKey) {
        self.state.lock().await.sort_key = key;
    }

    pub async fn sort_key(&self) -> SortKey {
        self.state.lock().await.sort_key
    }

    /// Projects sorted on the current key; the collection is untouched
    pub async fn sorted_view(&self) -> Vec<Project> {
        let state = self.state.lock().await;
        state
            .collection
            .sorted_view(state.sort_key)
            .into_iter()
            .cloned()
            .collect()
    }
}
