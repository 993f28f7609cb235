//! Dependency export: flatten a project's direct and internally-resolved
//! transitive dependencies into [`DependencyRecord`] rows.
//!
//! A dependency whose identifier contains one of the configured internal
//! group prefixes is treated as another project tracked by the same
//! service. It is resolved through the component identity lookup and its
//! own components are walked with the same visited set, so cycles between
//! internal projects terminate.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::client::DtClient;
use crate::entity::Entity;
use crate::error::{DtError, Result};
use crate::path::{Relation, ResourcePath};
use crate::resource::{Resource, ResourceKind};

/// Fields requested when listing projects for an export.
pub const PROJECT_FIELDS: &[&str] = &[
    "uuid",
    "name",
    "version",
    "group",
    "classifier",
    "lastBomImport",
    "externalReferences",
    "description",
];

/// Fields requested when listing a project's components.
pub const COMPONENT_FIELDS: &[&str] = &["purl", "name", "classifier", "uuid"];

const IDENTITY_FIELDS: &[&str] = &["purl", "project"];

const SELF_DEPENDENCY_AUTHOR: &str = "Self-dependency added by dtrack report";

/// Read access to the project/component graph.
///
/// Implemented for [`DtClient`]; tests substitute an in-memory graph.
#[async_trait]
pub trait DependencyGraph: Send + Sync {
    /// Fetch a project by uuid, `None` if it does not exist.
    async fn fetch_project(&self, uuid: &str) -> Result<Option<Entity>>;

    /// Components of a project, reduced to [`COMPONENT_FIELDS`].
    async fn project_components(&self, project_uuid: &str) -> Result<Vec<Entity>>;

    /// Components anywhere in the service whose purl matches, with their
    /// owning `project`.
    async fn identities(&self, purl: &str) -> Result<Vec<Entity>>;
}

#[async_trait]
impl DependencyGraph for DtClient {
    async fn fetch_project(&self, uuid: &str) -> Result<Option<Entity>> {
        Ok(self
            .project()
            .get(uuid, None)
            .await?
            .map(Resource::into_data))
    }

    async fn project_components(&self, project_uuid: &str) -> Result<Vec<Entity>> {
        let path = ResourcePath::root(Relation::Component.as_str())
            .join(Relation::Project.as_str())
            .join(project_uuid);
        Resource::at(self.clone(), path, ResourceKind::Generic)
            .list(Some(COMPONENT_FIELDS), &[])
            .await
    }

    async fn identities(&self, purl: &str) -> Result<Vec<Entity>> {
        self.component()
            .identity()
            .list(Some(IDENTITY_FIELDS), &[("purl", purl)])
            .await
    }
}

/// Options of one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Substring a `vcs` external reference must contain; empty matches any.
    pub vcs_domain: String,
    /// Dependency identifier substrings marking internal projects.
    pub internal_groups: Vec<String>,
    /// Restrict the exported projects (`searchText`); empty exports all.
    pub filter: String,
    /// Create the self-referencing component before walking a project.
    pub add_self_dependency: bool,
}

/// One exported row: project fields merged with one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub project_name: String,
    pub project_version: Option<String>,
    pub project_type: Option<String>,
    pub project_group: Option<String>,
    pub project_description: Option<String>,
    pub project_last_import: Option<String>,
    pub project_scm: Option<String>,
    pub project_uuid: String,
    pub dependency_url: Option<String>,
    pub dependency_classifier: Option<String>,
}

/// Column header of the exported table, in record field order.
pub const RECORD_COLUMNS: [&str; 10] = [
    "project_name",
    "project_version",
    "project_type",
    "project_group",
    "project_description",
    "project_last_import",
    "project_scm",
    "project_uuid",
    "dependency_url",
    "dependency_classifier",
];

/// Project-level half of a [`DependencyRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub group: Option<String>,
    pub description: Option<String>,
    pub last_import: Option<String>,
    pub scm: Option<String>,
    pub uuid: String,
}

impl ProjectFields {
    /// Extract the project fields from a project snapshot.
    ///
    /// `scm` is the first `vcs` external reference whose URL contains
    /// `vcs_domain`.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey` if the snapshot has no `name` or `uuid`.
    pub fn from_entity(project: &Entity, vcs_domain: &str) -> Result<Self> {
        let name = required_str(project, "name")?;
        let uuid = required_str(project, "uuid")?;

        Ok(Self {
            name,
            uuid,
            version: scalar_string(project.get("version")),
            classifier: scalar_string(project.get("classifier")),
            group: scalar_string(project.get("group")),
            description: scalar_string(project.get("description")),
            last_import: scalar_string(project.get("lastBomImport")),
            scm: scm_url(project, vcs_domain),
        })
    }

    fn record(
        &self,
        dependency_url: Option<String>,
        dependency_classifier: Option<String>,
    ) -> DependencyRecord {
        DependencyRecord {
            project_name: self.name.clone(),
            project_version: self.version.clone(),
            project_type: self.classifier.clone(),
            project_group: self.group.clone(),
            project_description: self.description.clone(),
            project_last_import: self.last_import.clone(),
            project_scm: self.scm.clone(),
            project_uuid: self.uuid.clone(),
            dependency_url,
            dependency_classifier,
        }
    }
}

fn required_str(entity: &Entity, key: &str) -> Result<String> {
    scalar_string(Some(entity.field(key)?)).ok_or_else(|| DtError::MissingKey(key.to_string()))
}

/// Render a scalar JSON value as text; null and containers give `None`.
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scm_url(project: &Entity, vcs_domain: &str) -> Option<String> {
    project
        .get("externalReferences")?
        .as_array()?
        .iter()
        .filter(|r| {
            r.get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case("vcs"))
        })
        .filter_map(|r| r.get("url").and_then(Value::as_str))
        .find(|url| url.contains(vcs_domain))
        .map(str::to_string)
}

/// Canonical identifier of a dependency: its purl, else its name.
pub fn dependency_url(component: &Entity) -> Option<String> {
    component
        .str_field("purl")
        .filter(|p| !p.is_empty())
        .or_else(|| component.str_field("name").filter(|n| !n.is_empty()))
        .map(str::to_string)
}

enum Frame {
    /// Components of this project still have to be listed.
    Project(String),
    /// Remaining components of a listed project.
    Components(VecDeque<Entity>),
    /// Internal dependency whose owning projects are not resolved yet.
    Resolve(String),
    /// Resolved internal projects not walked yet.
    Internal(VecDeque<String>),
}

/// Lazy depth-first walk over one project's dependencies.
///
/// Records come out in the order the components are listed; the
/// dependencies of an internal project follow right after the record that
/// references it. Each dependency identifier is emitted once per walk.
pub struct DependencyWalk<'g, G: DependencyGraph + ?Sized> {
    graph: &'g G,
    project: ProjectFields,
    internal_groups: Vec<String>,
    visited: HashSet<Option<String>>,
    stack: Vec<Frame>,
}

/// Start a walk over `project`'s dependencies.
///
/// # Errors
///
/// Returns `MissingKey` if the project snapshot lacks `name` or `uuid`.
pub fn project_dependencies<'g, G: DependencyGraph + ?Sized>(
    graph: &'g G,
    project: &Entity,
    vcs_domain: &str,
    internal_groups: &[String],
) -> Result<DependencyWalk<'g, G>> {
    let project = ProjectFields::from_entity(project, vcs_domain)?;
    let stack = vec![Frame::Project(project.uuid.clone())];
    Ok(DependencyWalk {
        graph,
        project,
        internal_groups: internal_groups.to_vec(),
        visited: HashSet::new(),
        stack,
    })
}

impl<'g, G: DependencyGraph + ?Sized> DependencyWalk<'g, G> {
    /// Project fields shared by every record of this walk.
    pub fn project(&self) -> &ProjectFields {
        &self.project
    }

    /// Dependency identifiers emitted so far.
    pub fn visited(&self) -> &HashSet<Option<String>> {
        &self.visited
    }

    fn is_internal(&self, dependency: &str) -> bool {
        self.internal_groups
            .iter()
            .any(|group| dependency.contains(group.as_str()))
    }

    /// Next record, or `None` when the walk is complete.
    ///
    /// The first error ends the walk.
    pub async fn next(&mut self) -> Option<Result<DependencyRecord>> {
        match self.advance().await {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.stack.clear();
                Some(Err(e))
            }
        }
    }

    /// Drain the walk into a vector.
    pub async fn collect(mut self) -> Result<Vec<DependencyRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record?);
        }
        Ok(records)
    }

    async fn advance(&mut self) -> Result<Option<DependencyRecord>> {
        loop {
            let Some(frame) = self.stack.pop() else {
                return Ok(None);
            };

            match frame {
                Frame::Project(uuid) => {
                    let components = self.graph.project_components(&uuid).await?;
                    self.stack.push(Frame::Components(components.into()));
                }
                Frame::Components(mut components) => {
                    let Some(component) = components.pop_front() else {
                        continue;
                    };
                    self.stack.push(Frame::Components(components));

                    let url = dependency_url(&component);
                    if !self.visited.insert(url.clone()) {
                        continue;
                    }
                    if let Some(internal) = url.as_deref().filter(|u| self.is_internal(u)) {
                        self.stack.push(Frame::Resolve(internal.to_string()));
                    }

                    let classifier = scalar_string(component.get("classifier"));
                    return Ok(Some(self.project.record(url, classifier)));
                }
                Frame::Resolve(purl) => {
                    let owners: VecDeque<String> = self
                        .graph
                        .identities(&purl)
                        .await?
                        .iter()
                        .filter_map(|identity| {
                            let owner = identity.get("project")?;
                            let owner_purl = owner.get("purl").and_then(Value::as_str)?;
                            (owner_purl == purl)
                                .then(|| owner.get("uuid").and_then(Value::as_str))
                                .flatten()
                                .map(str::to_string)
                        })
                        .collect();
                    tracing::debug!(%purl, owners = owners.len(), "resolved internal dependency");
                    self.stack.push(Frame::Internal(owners));
                }
                Frame::Internal(mut owners) => {
                    let Some(uuid) = owners.pop_front() else {
                        continue;
                    };
                    self.stack.push(Frame::Internal(owners));

                    if self.graph.fetch_project(&uuid).await?.is_none() {
                        tracing::warn!(%uuid, "internal project vanished, skipping");
                        continue;
                    }
                    self.stack.push(Frame::Project(uuid));
                }
            }
        }
    }
}

/// Give `project` a component that references its own purl, unless some
/// component owned by the project already does.
///
/// Returns `true` when a component was created. Projects without a purl
/// are left alone.
#[tracing::instrument(skip(project), fields(uuid = ?project.uuid()))]
pub async fn ensure_self_dependency(project: &Resource) -> Result<bool> {
    let Some(purl) = project.data().str_field("purl").filter(|p| !p.is_empty()) else {
        return Ok(false);
    };

    let has_self_component = project
        .client()
        .component()
        .identity()
        .list(None, &[("purl", purl)])
        .await?
        .iter()
        .any(|component| {
            component
                .get("project")
                .and_then(|p| p.get("purl"))
                .and_then(Value::as_str)
                == Some(purl)
        });
    if has_self_component {
        return Ok(false);
    }

    let mut entry = Entity::new();
    for key in ["name", "version", "group", "purl", "classifier"] {
        if let Some(value) = project.data().get(key).filter(|v| !v.is_null()) {
            entry.insert(key, value.clone());
        }
    }
    entry.insert("author", SELF_DEPENDENCY_AUTHOR);

    project.component().create(&entry).await?;
    tracing::info!(%purl, "added self-dependency");
    Ok(true)
}

/// Export every (matching) project's dependencies, handing records to
/// `sink` as they are produced. Returns the number of records.
pub async fn export_all<F>(client: &DtClient, options: &ExportOptions, mut sink: F) -> Result<usize>
where
    F: FnMut(DependencyRecord) -> Result<()>,
{
    let query: Vec<(&str, &str)> = if options.filter.is_empty() {
        Vec::new()
    } else {
        vec![("searchText", options.filter.as_str())]
    };

    let projects = client.project().list(Some(PROJECT_FIELDS), &query).await?;
    tracing::info!(count = projects.len(), "exporting projects");

    let mut written = 0;
    for summary in projects {
        let uuid = required_str(&summary, "uuid")?;
        let Some(project) = client.project().get(&uuid, None).await? else {
            tracing::warn!(%uuid, "project vanished during export, skipping");
            continue;
        };

        if options.add_self_dependency {
            ensure_self_dependency(&project).await?;
        }

        let mut walk = project_dependencies(
            client,
            project.data(),
            &options.vcs_domain,
            &options.internal_groups,
        )?;
        while let Some(record) = walk.next().await {
            sink(record?)?;
            written += 1;
        }
    }

    Ok(written)
}
