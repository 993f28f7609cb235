//! Project-specific payloads: creation data derived from a CycloneDX SBOM
//! and the BOM upload request.

use serde::Serialize;
use serde_json::Value;
use serde_with::{base64::Base64, serde_as};

use crate::entity::Entity;
use crate::error::{DtError, Result};

/// Build a project creation payload from a CycloneDX document.
///
/// Uses `metadata.component`: `name`, `version` and `purl` are copied,
/// `type` becomes the upper-cased `classifier`. `description` and `group`
/// are copied only when present and non-empty.
///
/// # Errors
///
/// Returns `InvalidManifest` if the metadata component or one of its
/// required fields is missing.
pub fn from_sbom(sbom: &Value) -> Result<Entity> {
    let artifact = sbom
        .pointer("/metadata/component")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            DtError::InvalidManifest("SBOM has no metadata.component".to_string())
        })?;

    let required = |key: &str| -> Result<Value> {
        artifact
            .get(key)
            .cloned()
            .ok_or_else(|| DtError::InvalidManifest(format!("metadata.component.{key} missing")))
    };

    let classifier = artifact
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| DtError::InvalidManifest("metadata.component.type missing".to_string()))?
        .to_uppercase();

    let mut project = Entity::new();
    project.insert("name", required("name")?);
    project.insert("version", required("version")?);
    project.insert("purl", required("purl")?);
    project.insert("classifier", classifier);

    for key in ["description", "group"] {
        if let Some(value) = artifact.get(key).filter(|v| is_present(v)) {
            project.insert(key, value.clone());
        }
    }

    Ok(project)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

/// Project a BOM is uploaded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BomTarget {
    /// An existing project, by uuid.
    Uuid { project: String },
    /// A project by name and version, optionally auto-created.
    #[serde(rename_all = "camelCase")]
    Named {
        project_name: String,
        project_version: String,
    },
}

/// Body of `PUT /bom`.
///
/// The document is sent base64-encoded in the `bom` field.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomUpload {
    #[serde_as(as = "Base64")]
    pub bom: Vec<u8>,

    #[serde(flatten)]
    pub target: BomTarget,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_create: Option<bool>,
}

impl BomUpload {
    /// Upload raw BOM bytes, e.g. a file read from disk.
    pub fn from_bytes(bom: Vec<u8>, target: BomTarget) -> Self {
        Self {
            bom,
            target,
            auto_create: None,
        }
    }

    /// Upload an in-memory BOM document.
    pub fn from_document(sbom: &Value, target: BomTarget) -> Result<Self> {
        Ok(Self::from_bytes(serde_json::to_vec(sbom)?, target))
    }

    /// Ask the service to create the named project if it does not exist.
    #[must_use]
    pub fn auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create = Some(auto_create);
        self
    }
}

/// Split a Maven package URL into group id, artifact name and version.
///
/// # Errors
///
/// Only `pkg:maven/<group>/<name>@<version>` is supported; anything else
/// is `InvalidManifest`.
pub fn purl_to_project(purl: &str) -> Result<(String, String, String)> {
    let invalid = || DtError::InvalidManifest(format!("unsupported purl '{purl}'"));

    let rest = purl.strip_prefix("pkg:maven/").ok_or_else(invalid)?;
    let (group, rest) = rest.split_once('/').ok_or_else(invalid)?;
    let (name, version) = rest.split_once('@').ok_or_else(invalid)?;
    if group.is_empty() || name.is_empty() || version.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok((group.to_string(), name.to_string(), version.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sbom(component: Value) -> Value {
        json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.4",
            "metadata": { "component": component }
        })
    }

    #[test]
    fn test_from_sbom_uppercases_type() {
        let project = from_sbom(&sbom(json!({
            "name": "dependencytrack-py",
            "version": "0.0.1",
            "purl": "pkg:maven/io.github/dependencytrack-py@0.0.1",
            "type": "application"
        })))
        .unwrap();

        assert_eq!(project.field("classifier").unwrap(), "APPLICATION");
        assert_eq!(project.field("name").unwrap(), "dependencytrack-py");
        assert_eq!(project.field("version").unwrap(), "0.0.1");
        assert_eq!(
            project.field("purl").unwrap(),
            "pkg:maven/io.github/dependencytrack-py@0.0.1"
        );
    }

    #[test]
    fn test_from_sbom_omits_empty_optional_fields() {
        let project = from_sbom(&sbom(json!({
            "name": "lib",
            "version": "2",
            "purl": "pkg:maven/org.acme/lib@2",
            "type": "library",
            "description": ""
        })))
        .unwrap();

        assert!(!project.contains_key("description"));
        assert!(!project.contains_key("group"));
        assert_eq!(project.len(), 4);
    }

    #[test]
    fn test_from_sbom_copies_present_optional_fields() {
        let project = from_sbom(&sbom(json!({
            "name": "lib",
            "version": "2",
            "purl": "pkg:maven/org.acme/lib@2",
            "type": "library",
            "description": "A library.",
            "group": "org.acme"
        })))
        .unwrap();

        assert_eq!(project.field("description").unwrap(), "A library.");
        assert_eq!(project.field("group").unwrap(), "org.acme");
    }

    #[test]
    fn test_from_sbom_requires_metadata_component() {
        let err = from_sbom(&json!({"metadata": {}})).unwrap_err();
        assert!(matches!(err, DtError::InvalidManifest(_)));

        let err = from_sbom(&sbom(json!({"name": "x", "version": "1", "type": "library"})))
            .unwrap_err();
        assert!(matches!(err, DtError::InvalidManifest(m) if m.contains("purl")));
    }

    #[test]
    fn test_bom_upload_by_uuid() {
        let upload = BomUpload::from_bytes(
            b"{}".to_vec(),
            BomTarget::Uuid {
                project: "abc".to_string(),
            },
        );
        let value = serde_json::to_value(&upload).unwrap();
        assert_eq!(value, json!({"bom": "e30=", "project": "abc"}));
    }

    #[test]
    fn test_bom_upload_by_name() {
        let upload = BomUpload::from_bytes(
            b"{}".to_vec(),
            BomTarget::Named {
                project_name: "acme".to_string(),
                project_version: "1.0".to_string(),
            },
        )
        .auto_create(true);
        let value = serde_json::to_value(&upload).unwrap();
        assert_eq!(
            value,
            json!({
                "bom": "e30=",
                "projectName": "acme",
                "projectVersion": "1.0",
                "autoCreate": true
            })
        );
    }

    #[test]
    fn test_purl_to_project() {
        let (group, name, version) =
            purl_to_project("pkg:maven/io.github/dependencytrack-py@0.0.1").unwrap();
        assert_eq!(group, "io.github");
        assert_eq!(name, "dependencytrack-py");
        assert_eq!(version, "0.0.1");

        assert!(purl_to_project("pkg:npm/left-pad@1.0.0").is_err());
        assert!(purl_to_project("pkg:maven/io.github/no-version").is_err());
    }
}
