//! Client wiring

use std::sync::Arc;

use auth::{SessionHandle, SessionStore};
use common::config::ClientConfig;
use common::gateway::Gateway;
use common::storage::{CredentialStore, FileCredentialStore};
use projects::ProjectController;
use tracing::info;

/// Stores sharing one gateway and one session
pub struct App {
    pub session: SessionStore,
    pub projects: ProjectController,
}

impl App {
    /// Build the client on the file-backed credential store
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(
            config.storage_path.clone(),
            config.storage_key.clone(),
        ));
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> anyhow::Result<Self> {
        let session = SessionHandle::new(credentials.clone());
        let gateway = Gateway::new(config, credentials, Arc::new(session.clone()))?;

        info!("Client ready for {}", gateway.base_url());

        Ok(Self {
            session: SessionStore::new(gateway.clone(), session),
            projects: ProjectController::new(gateway),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use auth::SessionState;
    use auth::models::LoginCredentials;
    use common::storage::MemoryCredentialStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/users/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access": "tok1",
                "id": 1,
                "username": "alice"
            })))
            .mount(server)
            .await;
    }

    fn config(server: &MockServer, storage_path: std::path::PathBuf) -> ClientConfig {
        ClientConfig {
            base_url: format!("{}/api/", server.uri()),
            storage_path,
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unauthorized_project_list_signs_session_out() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/projects/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = App::new(&config(&server, dir.path().join("storage.json"))).unwrap();

        let login = app
            .session
            .login(&LoginCredentials::new("alice", "secret"))
            .await;
        assert!(login.is_fulfilled());
        assert!(app.session.is_authenticated().await);

        let listed = app.projects.list().await;
        assert_eq!(listed.error(), Some("Failed to load projects"));
        assert!(!app.session.is_authenticated().await);
        assert_eq!(app.session.session().credential().await, None);

        let stored = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
        assert!(!stored.contains("tok1"));
    }

    #[tokio::test]
    async fn test_concurrent_unauthorized_requests_all_end_signed_out() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        for endpoint in ["/api/users/profile/", "/api/projects/", "/api/users/list/"] {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let store = Arc::new(MemoryCredentialStore::new());
        let app = App::with_credentials(&config(&server, "unused.json".into()), store).unwrap();
        let credentials = LoginCredentials::new("alice", "secret");
        assert!(app.session.login(&credentials).await.is_fulfilled());

        let (profile, projects, users) = tokio::join!(
            app.session.fetch_profile(),
            app.projects.list(),
            app.projects.list_users()
        );

        assert_eq!(profile.error(), Some("Failed to load profile"));
        assert_eq!(projects.error(), Some("Failed to load projects"));
        assert_eq!(users.error(), Some("Failed to load users"));

        assert_eq!(app.session.session().credential().await, None);
        let session = app.session.snapshot().await;
        assert_eq!(session.user(), None);
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_recovers_from_corrupt_storage_file() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let dir = tempfile::tempdir().unwrap();
        let storage_path = dir.path().join("storage.json");
        std::fs::write(&storage_path, r#"{"token": "tok0", "trunc"#).unwrap();
        let app = App::new(&config(&server, storage_path.clone())).unwrap();

        let credentials = LoginCredentials::new("alice", "secret");
        assert!(app.session.login(&credentials).await.is_fulfilled());
        assert_eq!(
            app.session.session().credential().await.as_deref(),
            Some("tok1")
        );

        assert!(app.session.logout().await.is_fulfilled());
        let stored = std::fs::read_to_string(&storage_path).unwrap();
        assert!(!stored.contains("tok"));

        assert!(app.session.login(&credentials).await.is_fulfilled());
    }
}
