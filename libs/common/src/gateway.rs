//! Request gateway
//!
//! Every outbound call goes through [`Gateway::send`]. The gateway reads
//! the persisted credential before each request and attaches it as a
//! bearer token. A 401 response invalidates the session through the
//! injected [`SessionInvalidator`] before the error is handed back, so
//! every component that shares the gateway converges on the same
//! signed-out state. There is no retry and no token refresh.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::storage::CredentialStore;

/// Receiver of the 401 side effect
///
/// Implementations must be idempotent: concurrent requests may all observe
/// a 401 and each of them triggers one call.
#[async_trait]
pub trait SessionInvalidator: Send + Sync {
    /// Clear the credential and the in-memory user
    async fn invalidate(&self);
}

/// Body of an outbound request
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body; the request still advertises JSON
    #[default]
    Empty,
    /// JSON body
    Json(serde_json::Value),
    /// `multipart/form-data` body
    Multipart(Form),
}

/// Error payload shape used by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Single chokepoint for HTTP calls to the backend
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
    invalidator: Arc<dyn SessionInvalidator>,
}

impl Gateway {
    /// Build a gateway from configuration, the credential store it reads
    /// on every request, and the session it invalidates on 401
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        invalidator: Arc<dyn SessionInvalidator>,
    ) -> ClientResult<Self> {
        let base_url = config
            .base_url()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Transport)?;

        Ok(Self {
            client,
            base_url,
            credentials,
            invalidator,
        })
    }

    /// Base URL request paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path against the base URL. A leading slash is
    /// ignored so `/projects/` and `projects/` reach the same endpoint.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidRequest(format!("{path}: {e}")))
    }

    async fn credential(&self) -> Option<String> {
        match self.credentials.load().await {
            Ok(credential) => credential.filter(|c| !c.is_empty()),
            Err(e) => {
                warn!("Failed to read credential, sending unauthenticated: {}", e);
                None
            }
        }
    }

    /// Send a request and return the successful response
    ///
    /// Non-2xx statuses come back as [`ClientError::Rejected`], except 401,
    /// which first invalidates the session and then comes back as
    /// [`ClientError::Unauthorized`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        headers: Option<HeaderMap>,
    ) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        let mut request = self.client.request(method.clone(), url);

        request = match body {
            RequestBody::Empty => {
                request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        if let Some(headers) = headers {
            request = request.headers(headers);
        }

        let credential = self.credential().await;
        let authenticated = credential.is_some();
        if let Some(token) = credential {
            request = request.bearer_auth(token);
        }

        debug!(%method, path, authenticated, "Dispatching request");

        let response = request.send().await.map_err(|e| {
            error!(%method, path, "Request failed without a response: {}", e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "Response received");

        if status == StatusCode::UNAUTHORIZED {
            let detail = read_detail(response).await;
            warn!(%method, path, "Authorization rejected, invalidating session");
            self.invalidator.invalidate().await;
            return Err(ClientError::Unauthorized { detail });
        }

        if !status.is_success() {
            let detail = read_detail(response).await;
            warn!(%method, path, status = status.as_u16(), "Request rejected");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }

    /// GET `path` and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .send(Method::GET, path, RequestBody::Empty, None)
            .await?;
        decode(response).await
    }

    /// POST a JSON body to `path` and decode the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, json_body(body)?, None).await?;
        decode(response).await
    }

    /// PUT a JSON body to `path` and decode the JSON response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, path, json_body(body)?, None).await?;
        decode(response).await
    }

    /// PUT a multipart form to `path` and decode the JSON response
    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ClientResult<T> {
        let response = self
            .send(Method::PUT, path, RequestBody::Multipart(form), None)
            .await?;
        decode(response).await
    }

    /// DELETE `path`, ignoring any response body
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(Method::DELETE, path, RequestBody::Empty, None)
            .await?;
        Ok(())
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> ClientResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(ClientError::Encode)
}

/// Decode a success body into `T`. An empty body decodes as JSON `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await.map_err(ClientError::Transport)?;
    let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(bytes).map_err(|e| {
        warn!("Response body did not match the expected schema: {}", e);
        ClientError::Decode(e)
    })
}

/// Pull `detail` out of an error body; empty or missing detail is `None`
async fn read_detail(response: Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.detail)
        .filter(|detail| !detail.is_empty())
}
