//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Dependency-Track server.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::Entity;

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Projects indexed by uuid.
    pub projects: HashMap<String, Entity>,

    /// Components indexed by owning project uuid, in creation order.
    pub components: HashMap<String, Vec<Entity>>,

    /// BOM upload bodies indexed by processing token.
    pub uploads: HashMap<String, Value>,

    /// Optional authentication token. If set, requests must send it as `X-Api-Key`.
    pub required_token: Option<String>,
}

/// Outcome of a create request.
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    Ok(Entity),
    Duplicate,
    MissingParent,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a project. A missing `uuid` is generated.
    pub fn with_project(mut self, project: Entity) -> Self {
        self.insert_project(project);
        self
    }

    /// Add a component to an existing project.
    pub fn with_component(mut self, project_uuid: &str, component: Entity) -> Self {
        self.add_component(project_uuid, component);
        self
    }

    /// Require `token` on every request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Get a project by uuid.
    pub fn get_project(&self, uuid: &str) -> Option<&Entity> {
        self.projects.get(uuid)
    }

    /// List projects sorted by name and version, optionally filtered by a
    /// case-insensitive name substring.
    pub fn list_projects(&self, search: Option<&str>) -> Vec<&Entity> {
        let mut projects: Vec<&Entity> = self
            .projects
            .values()
            .filter(|p| {
                search
                    .map(|s| {
                        p.str_field("name")
                            .unwrap_or_default()
                            .to_lowercase()
                            .contains(&s.to_lowercase())
                    })
                    .unwrap_or(true)
            })
            .collect();
        projects.sort_by_key(|p| {
            (
                p.str_field("name").unwrap_or_default().to_string(),
                p.str_field("version").unwrap_or_default().to_string(),
            )
        });
        projects
    }

    /// Create a project unless one with the same name and version exists.
    pub fn create_project(&mut self, project: Entity) -> Created {
        let name = project.str_field("name");
        let version = project.str_field("version");
        let duplicate = self
            .projects
            .values()
            .any(|p| p.str_field("name") == name && p.str_field("version") == version);
        if duplicate {
            return Created::Duplicate;
        }
        Created::Ok(self.insert_project(project))
    }

    fn insert_project(&mut self, mut project: Entity) -> Entity {
        let uuid = match project.uuid() {
            Some(uuid) => uuid.to_string(),
            None => {
                let uuid = uuid::Uuid::new_v4().to_string();
                project.insert("uuid", uuid.clone());
                uuid
            }
        };
        self.components.entry(uuid.clone()).or_default();
        self.projects.insert(uuid, project.clone());
        project
    }

    /// Merge `patch` into a project and return the updated version.
    pub fn update_project(&mut self, uuid: &str, patch: Entity) -> Option<&Entity> {
        let project = self.projects.get_mut(uuid)?;
        for (key, value) in patch.iter() {
            if key != "uuid" {
                project.insert(key.clone(), value.clone());
            }
        }
        self.projects.get(uuid)
    }

    /// Delete a project and its components.
    pub fn delete_project(&mut self, uuid: &str) -> bool {
        self.components.remove(uuid);
        self.projects.remove(uuid).is_some()
    }

    /// Find a project by exact name and, if given, version.
    pub fn lookup_project(&self, name: &str, version: Option<&str>) -> Option<&Entity> {
        self.list_projects(None).into_iter().find(|p| {
            p.str_field("name") == Some(name)
                && version.map_or(true, |v| p.str_field("version") == Some(v))
        })
    }

    /// Components of a project, `None` if the project does not exist.
    pub fn project_components(&self, project_uuid: &str) -> Option<&Vec<Entity>> {
        self.components.get(project_uuid)
    }

    /// Add a component to a project, embedding the owning project reference
    /// the way the service reports it.
    ///
    /// A project holds at most one component per purl.
    pub fn add_component(&mut self, project_uuid: &str, mut component: Entity) -> Created {
        let Some(project) = self.projects.get(project_uuid) else {
            return Created::MissingParent;
        };
        if let Some(purl) = component.str_field("purl").filter(|p| !p.is_empty()) {
            let siblings = self.components.get(project_uuid).map(Vec::as_slice);
            if siblings
                .unwrap_or_default()
                .iter()
                .any(|c| c.str_field("purl") == Some(purl))
            {
                return Created::Duplicate;
            }
        }
        if component.uuid().is_none() {
            component.insert("uuid", uuid::Uuid::new_v4().to_string());
        }
        component.insert(
            "project",
            json!({
                "uuid": project_uuid,
                "name": project.get("name"),
                "version": project.get("version"),
                "purl": project.get("purl"),
            }),
        );
        self.components
            .entry(project_uuid.to_string())
            .or_default()
            .push(component.clone());
        Created::Ok(component)
    }

    /// Components of any project whose purl equals `purl`.
    pub fn identity(&self, purl: &str) -> Vec<&Entity> {
        let mut owners: Vec<&String> = self.components.keys().collect();
        owners.sort();
        owners
            .into_iter()
            .flat_map(|owner| &self.components[owner])
            .filter(|c| c.str_field("purl") == Some(purl))
            .collect()
    }

    /// Properties stored on a project, `None` if the project does not exist.
    pub fn project_properties(&self, uuid: &str) -> Option<Vec<Value>> {
        let project = self.projects.get(uuid)?;
        Some(
            project
                .get("properties")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        )
    }

    /// Record a BOM upload and return its processing token.
    pub fn upload_bom(&mut self, body: Value) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.uploads.insert(token.clone(), body);
        token
    }
}
