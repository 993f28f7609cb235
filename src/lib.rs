//! Dependency-Track API client library.
//!
//! A Rust library for the Dependency-Track REST API built around one
//! uniform resource handle: every collection or instance (`project`,
//! `project/<uuid>/property`, `component/identity`, ...) supports the same
//! get/list/create/update/upload/delete/lookup operations, and
//! sub-resources are reached through a fixed set of relations.
//!
//! # Quick Start
//!
//! ```no_run
//! use dtrack::{DtClient, Entity};
//!
//! #[tokio::main]
//! async fn main() -> dtrack::Result<()> {
//!     // Create client from environment variables
//!     let client = DtClient::from_env()?;
//!
//!     // List all projects, keeping only a few fields
//!     let projects = client.project().list(Some(&["uuid", "name"][..]), &[]).await?;
//!     println!("Found {} projects", projects.len());
//!
//!     // Get a project by uuid; absent projects are `None`
//!     if let Some(summary) = projects.first() {
//!         let uuid = summary.uuid().unwrap_or_default();
//!         if let Some(project) = client.project().get(uuid, None).await? {
//!             // Components are listed through the project-scoped endpoint
//!             let components = project.component().list(None, &[]).await?;
//!             println!("{} has {} components", project.field("name")?, components.len());
//!         }
//!     }
//!
//!     // Create and delete a project
//!     let mut entry = Entity::new();
//!     entry.insert("name", "deleteme");
//!     entry.insert("version", "1.0");
//!     let created = client.project().create(&entry).await?;
//!     created.delete(None).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`DtClient`] - HTTP invoker: authentication, paging parameters and
//!   status classification
//! - [`Resource`] - handle to a collection or instance, with the snapshot
//!   of the last fetched data
//! - [`project`] - SBOM-derived project payloads and BOM uploads
//! - [`export`] - flatten a project's dependency graph into rows
//!
//! # Configuration
//!
//! The client reads configuration from a YAML file (see [`ClientConfig`])
//! or from environment variables:
//!
//! - `DT_API_KEY` (required) - Your Dependency-Track API key
//! - `DT_API_URL` (optional) - Base URL (defaults to `http://localhost:8081/api/v1`)

pub mod cli;
mod client;
mod config;
mod entity;
mod error;
pub mod export;
mod output;
mod pagination;
mod path;
pub mod project;
pub mod report;
mod resource;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::DtClient;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use entity::{filter_fields, Entity, UUID_FIELD};
pub use error::{DtError, Result};
pub use output::PrettyPrint;
pub use pagination::{PageParams, DEFAULT_PAGE_SIZE};
pub use path::{Relation, ResourcePath};
pub use resource::{Resource, ResourceKind};

// Re-export payload builders and the exporter entry points
pub use export::{
    export_all, project_dependencies, DependencyGraph, DependencyRecord, DependencyWalk,
    ExportOptions,
};
pub use project::{from_sbom, BomTarget, BomUpload};
