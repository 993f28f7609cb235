//! Uniform handle over Dependency-Track REST resources.
//!
//! A [`Resource`] addresses either a collection (`project`) or an instance
//! (`project/<uuid>`) and carries the last snapshot fetched for it. Every
//! resource supports the same operations; sub-resources are reached through
//! the fixed set of [`Relation`]s.
//!
//! # Absent resources
//!
//! A 404 never escapes `get`, `get_many`, `list` or `lookup`: single-instance reads
//! return `Ok(None)` and collection reads return an empty `Vec`. All other
//! operations propagate [`DtError::NotFound`].

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::client::DtClient;
use crate::entity::{filter_fields, Entity};
use crate::error::{DtError, Result};
use crate::path::{Relation, ResourcePath};

/// Behaviour variant of a resource handle.
///
/// Project handles route `component` and `service` through the
/// project-scoped endpoints and keep their kind across `get`, `create` and
/// `lookup` whenever the returned data carries a `uuid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Generic,
    Project,
}

/// Addressable handle to one collection or instance.
#[derive(Debug, Clone)]
pub struct Resource {
    client: DtClient,
    path: ResourcePath,
    kind: ResourceKind,
    data: Entity,
}

impl Resource {
    /// Bind a handle to `path` without fetching anything.
    pub fn at(client: DtClient, path: ResourcePath, kind: ResourceKind) -> Self {
        Self {
            client,
            path,
            kind,
            data: Entity::new(),
        }
    }

    fn with_data(&self, path: ResourcePath, data: Entity) -> Self {
        let kind = if data.uuid().is_some() {
            self.kind
        } else {
            ResourceKind::Generic
        };
        Self {
            client: self.client.clone(),
            path,
            kind,
            data,
        }
    }

    pub fn client(&self) -> &DtClient {
        &self.client
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_project(&self) -> bool {
        self.kind == ResourceKind::Project
    }

    /// Snapshot of the last fetched instance data (empty if none).
    pub fn data(&self) -> &Entity {
        &self.data
    }

    pub fn into_data(self) -> Entity {
        self.data
    }

    /// Identifier of the bound instance, taken from the snapshot.
    pub fn uuid(&self) -> Option<&str> {
        self.data.uuid()
    }

    // Mapping-style access to the snapshot.

    /// Snapshot value for `key`; absent keys are an error.
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.data.field(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.data.iter()
    }

    /// Fetch one instance by identifier.
    ///
    /// With `fields`, keys outside the allowlist are dropped from the
    /// snapshot. Returns `Ok(None)` if the instance does not exist.
    ///
    /// Paths that answer with a list are read with [`Resource::get_many`].
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn get(&self, id: &str, fields: Option<&[&str]>) -> Result<Option<Resource>> {
        let path = self.path.join(id);
        let value = match self.fetch(&path, &[], false).await? {
            Some(v) => v,
            None => return Ok(None),
        };
        if value.is_array() {
            return Err(DtError::UnexpectedPayload(format!("{path} returned a list, use get_many")));
        }

        let mut data = Entity::from_value(value)?;
        if let Some(fields) = fields {
            data.retain_fields(fields);
        }
        Ok(Some(self.with_data(path, data)))
    }

    /// Fetch an identifier whose path answers with a list, such as
    /// `component/project/<uuid>` or `project/tag/<name>`.
    ///
    /// With `fields`, every item is narrowed to the allowlist. A single
    /// object comes back as a one-item list. Returns `Ok(None)` if the path
    /// does not exist.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn get_many(
        &self,
        id: &str,
        fields: Option<&[&str]>,
    ) -> Result<Option<Vec<Entity>>> {
        let path = self.path.join(id);
        let value = match self.fetch(&path, &[], false).await? {
            Some(v) => v,
            None => return Ok(None),
        };

        let items = match value {
            Value::Array(items) => items
                .into_iter()
                .map(Entity::from_value)
                .collect::<Result<Vec<_>>>()?,
            other => vec![Entity::from_value(other)?],
        };
        tracing::debug!(count = items.len(), "retrieved items");
        Ok(Some(filter_fields(items, fields)))
    }

    /// Fetch the collection. `query` is forwarded verbatim.
    ///
    /// With `fields`, every item is narrowed to the allowlist. Returns an
    /// empty list if the collection does not exist.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn list(
        &self,
        fields: Option<&[&str]>,
        query: &[(&str, &str)],
    ) -> Result<Vec<Entity>> {
        let value = match self.fetch(&self.path, query, true).await? {
            Some(v) => v,
            None => return Ok(Vec::new()),
        };

        let items: Vec<Entity> = serde_json::from_value(value)?;
        tracing::debug!(count = items.len(), "retrieved items");
        Ok(filter_fields(items, fields))
    }

    /// Create an instance (PUT on the collection).
    ///
    /// The returned handle is bound to the new instance when the service
    /// answers with a `uuid`, else it stays on this collection path.
    #[tracing::instrument(skip(self, entry), fields(path = %self.path))]
    pub async fn create(&self, entry: &Entity) -> Result<Resource> {
        let body = serde_json::to_value(entry)?;
        let response = self
            .client
            .invoke(Method::PUT, self.path.as_str(), &[], Some(&body), false)
            .await?;
        let data = Entity::from_value(response.json().await?)?;

        let path = match data.uuid() {
            Some(uuid) => self.path.join(uuid),
            None => self.path.clone(),
        };
        Ok(self.with_data(path, data))
    }

    /// Upload a BOM. Only valid on a `bom` path; anything else fails with
    /// `BadRequest` before a request is made.
    ///
    /// Returns the raw response, which carries the processing `token`.
    #[tracing::instrument(skip(self, payload), fields(path = %self.path))]
    pub async fn upload<B: Serialize + ?Sized>(&self, payload: &B) -> Result<Entity> {
        if self.path.last_segment() != Relation::Bom.as_str() {
            return Err(DtError::BadRequest {
                status: 400,
                detail: format!("can only upload boms, not to {}", self.path),
            });
        }
        let body = serde_json::to_value(payload)?;
        let response = self
            .client
            .invoke(Method::PUT, self.path.as_str(), &[], Some(&body), false)
            .await?;
        Entity::from_value(response.json().await?)
    }

    /// Partially update an instance (PATCH). Returns the updated data.
    #[tracing::instrument(skip(self, entry), fields(path = %self.path))]
    pub async fn update(&self, id: &str, entry: &Entity) -> Result<Entity> {
        let path = self.path.join(id);
        let body = serde_json::to_value(entry)?;
        let response = self
            .client
            .invoke(Method::PATCH, path.as_str(), &[], Some(&body), false)
            .await?;
        Entity::from_value(response.json().await?)
    }

    /// Generic action (POST on this path).
    #[tracing::instrument(skip(self, body), fields(path = %self.path))]
    pub async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        let response = self
            .client
            .invoke(Method::POST, self.path.as_str(), &[], Some(&body), false)
            .await?;
        Ok(response.json().await?)
    }

    /// Delete the bound instance, or `id` under this collection.
    ///
    /// The bound instance wins when this path already ends with its own
    /// `uuid`. Anything but `204 No Content` is an error.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn delete(&self, id: Option<&str>) -> Result<()> {
        let path = match (self.uuid(), id) {
            (Some(uuid), _) if self.path.last_segment() == uuid => self.path.clone(),
            (_, Some(id)) => self.path.join(id),
            _ => return Err(DtError::NoDeleteTarget),
        };

        let response = self
            .client
            .invoke(Method::DELETE, path.as_str(), &[], None, false)
            .await?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let detail = DtClient::extract_error_message(response, status).await;
            return Err(DtError::UnexpectedStatus {
                status: status.as_u16(),
                detail: format!("could not delete {path}: {detail}"),
            });
        }
        Ok(())
    }

    /// Resolve one instance through the `lookup` sub-path, e.g. a project
    /// by `name` and `version`.
    ///
    /// Returns `Ok(None)` if nothing matches. A project lookup answered
    /// without a `uuid` fails with `MissingIdentifier`; generic lookups
    /// return the raw data bound to the lookup path instead.
    #[tracing::instrument(skip(self), fields(path = %self.path))]
    pub async fn lookup(&self, criteria: &[(&str, &str)]) -> Result<Option<Resource>> {
        let lookup_path = self.path.join("lookup");
        let value = match self.fetch(&lookup_path, criteria, true).await? {
            Some(v) => v,
            None => return Ok(None),
        };
        let data = Entity::from_value(value)?;

        match data.uuid() {
            Some(uuid) => {
                let path = self.path.join(uuid);
                Ok(Some(self.with_data(path, data)))
            }
            None if self.is_project() => Err(DtError::MissingIdentifier(format!(
                "lookup on {} returned no uuid for {criteria:?}",
                self.path
            ))),
            None => Ok(Some(self.with_data(lookup_path, data))),
        }
    }

    /// Handle to a sub-resource.
    ///
    /// A project bound to an instance routes `component` and `service`
    /// through `component/project/<uuid>` and `service/project/<uuid>`.
    /// Everything else appends the relation name to this path.
    pub fn child(&self, relation: Relation) -> Resource {
        let path = match (self.kind, relation, self.uuid()) {
            (ResourceKind::Project, Relation::Component | Relation::Service, Some(uuid)) => {
                ResourcePath::root(relation.as_str())
                    .join(Relation::Project.as_str())
                    .join(uuid)
            }
            _ => self.path.join(relation.as_str()),
        };
        Resource::at(self.client.clone(), path, ResourceKind::Generic)
    }

    /// Handle to a sub-resource named at runtime.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRelation` for names outside [`Relation::ALL`].
    pub fn relation(&self, name: &str) -> Result<Resource> {
        Ok(self.child(name.parse()?))
    }

    pub fn service(&self) -> Resource {
        self.child(Relation::Service)
    }

    pub fn project(&self) -> Resource {
        self.child(Relation::Project)
    }

    pub fn component(&self) -> Resource {
        self.child(Relation::Component)
    }

    pub fn vulnerability(&self) -> Resource {
        self.child(Relation::Vulnerability)
    }

    pub fn bom(&self) -> Resource {
        self.child(Relation::Bom)
    }

    pub fn tag(&self) -> Resource {
        self.child(Relation::Tag)
    }

    pub fn property(&self) -> Resource {
        self.child(Relation::Property)
    }

    pub fn identity(&self) -> Resource {
        self.child(Relation::Identity)
    }

    /// GET `path`, mapping 404 to `None`.
    async fn fetch(
        &self,
        path: &ResourcePath,
        query: &[(&str, &str)],
        paginated: bool,
    ) -> Result<Option<Value>> {
        match self
            .client
            .invoke(Method::GET, path.as_str(), query, None, paginated)
            .await
        {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(DtError::NotFound { url }) => {
                tracing::info!("Could not find {url}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> DtClient {
        DtClient::new("token", "https://dt.example.com/api/v1").unwrap()
    }

    fn bound_project(uuid: &str) -> Resource {
        let project = client().project();
        let data = Entity::from_value(json!({"uuid": uuid, "name": "acme"})).unwrap();
        project.with_data(project.path().join(uuid), data)
    }

    #[test]
    fn test_generic_child_appends_relation() {
        let component = client().component();
        assert_eq!(component.identity().path().as_str(), "component/identity");
        assert_eq!(client().project().tag().path().as_str(), "project/tag");
    }

    #[test]
    fn test_project_routes_components_through_project_scope() {
        let project = bound_project("abc");
        assert_eq!(project.kind(), ResourceKind::Project);
        assert_eq!(project.component().path().as_str(), "component/project/abc");
        assert_eq!(project.service().path().as_str(), "service/project/abc");
        assert_eq!(project.property().path().as_str(), "project/abc/property");
    }

    #[test]
    fn test_unbound_project_uses_plain_traversal() {
        let project = client().project();
        assert_eq!(project.component().path().as_str(), "project/component");
    }

    #[test]
    fn test_relation_by_name() {
        let project = bound_project("abc");
        assert_eq!(
            project.relation("vulnerability").unwrap().path().as_str(),
            "project/abc/vulnerability"
        );
        let err = project.relation("owner").unwrap_err();
        assert!(matches!(err, DtError::UnsupportedRelation(_)));
    }

    #[test]
    fn test_kind_degrades_without_uuid() {
        let project = client().project();
        let data = Entity::from_value(json!({"token": "t"})).unwrap();
        let handle = project.with_data(project.path().clone(), data);
        assert_eq!(handle.kind(), ResourceKind::Generic);
    }

    #[test]
    fn test_mapping_access_on_snapshot() {
        let project = bound_project("abc");
        assert_eq!(project.len(), 2);
        assert_eq!(project.iter().count(), 2);
        assert!(project.contains_key("name"));
        assert_eq!(project.field("name").unwrap(), "acme");
        assert!(matches!(
            project.field("version"),
            Err(DtError::MissingKey(_))
        ));
    }

    #[test]
    fn test_delete_without_target() {
        let result = tokio_test::block_on(client().project().delete(None));
        assert!(matches!(result, Err(DtError::NoDeleteTarget)));
    }
}
