//! Mock Dependency-Track server for E2E testing.
//!
//! This module provides an in-memory server that answers the subset of the
//! Dependency-Track REST API the client and the exporter use. Unlike
//! wiremock, which mocks at the HTTP level per test, this server keeps state
//! across requests, so create/get/delete workflows and graph walks can be
//! exercised end to end.
//!
//! # Example
//!
//! ```ignore
//! use dtrack::mock_server::{MockServer, APP_UUID};
//! use dtrack::DtClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = DtClient::new("test-token", server.url()).unwrap();
//!
//!     // Server comes with the default scenario
//!     let project = client.project().get(APP_UUID, None).await.unwrap().unwrap();
//!     assert_eq!(project.field("name").unwrap(), "acme-app");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{
    DefaultScenario, Fixtures, APP_PURL, APP_UUID, CORE_PURL, CORE_UUID, JACKSON_PURL, SLF4J_PURL,
};
pub use server::MockServer;
pub use state::{Created, MockState};
