//! Integration tests for the gateway and the file-backed credential store
//!
//! These tests run the gateway against a mock backend with the credential
//! persisted on disk, the way the command-line client wires it.

use std::sync::Arc;

use async_trait::async_trait;
use common::{
    config::ClientConfig,
    error::ClientError,
    gateway::{Gateway, SessionInvalidator},
    storage::{CredentialStore, FileCredentialStore},
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Invalidator that clears the persisted credential, as the session does
struct ClearStore(Arc<FileCredentialStore>);

#[async_trait]
impl SessionInvalidator for ClearStore {
    async fn invalidate(&self) {
        let _ = self.0.clear().await;
    }
}

/// A 401 clears the credential on disk, and the next request goes out
/// without an Authorization header
#[tokio::test]
async fn test_unauthorized_clears_persisted_credential() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(FileCredentialStore::new(dir.path().join("storage.json"), "token"));
    store.save("expired").await?;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/profile/"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        base_url: format!("{}/api/", server.uri()),
        ..ClientConfig::default()
    };
    let gateway = Gateway::new(&config, store.clone(), Arc::new(ClearStore(store.clone())))?;

    let result: Result<serde_json::Value, ClientError> = gateway.get("users/profile/").await;
    assert!(matches!(result, Err(ClientError::Unauthorized { .. })));
    assert_eq!(
        store.load().await?,
        None,
        "401 must clear the stored credential"
    );

    let _: serde_json::Value = gateway.get("projects/").await?;
    let requests = server.received_requests().await.unwrap_or_default();
    let last = requests.last().ok_or("no request recorded")?;
    assert!(!last.headers.contains_key("authorization"));

    Ok(())
}
