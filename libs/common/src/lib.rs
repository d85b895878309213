//! Common library for the Taskdeck client
//!
//! This crate provides the pieces shared by the session and project
//! clients: configuration, credential storage, the request gateway every
//! HTTP call goes through, and the three-phase action protocol.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use common::config::ClientConfig;
//! use common::gateway::{Gateway, SessionInvalidator};
//! use common::storage::MemoryCredentialStore;
//!
//! struct Forget;
//!
//! #[async_trait]
//! impl SessionInvalidator for Forget {
//!     async fn invalidate(&self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let credentials = Arc::new(MemoryCredentialStore::new());
//!     let gateway = Gateway::new(&config, credentials, Arc::new(Forget))?;
//!     let projects: serde_json::Value = gateway.get("projects/").await?;
//!     println!("{projects}");
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod config;
pub mod de;
pub mod error;
pub mod gateway;
pub mod storage;
