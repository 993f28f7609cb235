//! Resource paths and the relations that can be traversed from them.

use std::fmt;
use std::str::FromStr;

use crate::error::{DtError, Result};

/// Slash-separated path of a collection or instance, relative to the API root.
///
/// Paths are never empty and never change once a [`crate::Resource`] holds them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Create a root path such as `project` or `component`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the root is empty or only slashes.
    pub fn new(root: &str) -> Result<Self> {
        let trimmed = root.trim_matches('/');
        if trimmed.is_empty() {
            return Err(DtError::InvalidConfig(
                "resource path must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Root path for a name known at compile time.
    pub(crate) fn root(name: &'static str) -> Self {
        debug_assert!(!name.is_empty());
        Self(name.to_string())
    }

    /// Append one segment. The segment is percent-encoded.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, urlencoding::encode(segment)))
    }

    /// The final path segment.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sub-resources reachable from any resource handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Service,
    Project,
    Component,
    Vulnerability,
    Bom,
    Tag,
    Property,
    Identity,
}

impl Relation {
    /// Every supported relation.
    pub const ALL: [Relation; 8] = [
        Relation::Service,
        Relation::Project,
        Relation::Component,
        Relation::Vulnerability,
        Relation::Bom,
        Relation::Tag,
        Relation::Property,
        Relation::Identity,
    ];

    /// Path segment used by the service.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Service => "service",
            Relation::Project => "project",
            Relation::Component => "component",
            Relation::Vulnerability => "vulnerability",
            Relation::Bom => "bom",
            Relation::Tag => "tag",
            Relation::Property => "property",
            Relation::Identity => "identity",
        }
    }
}

impl FromStr for Relation {
    type Err = DtError;

    fn from_str(name: &str) -> Result<Self> {
        Relation::ALL
            .into_iter()
            .find(|r| r.as_str() == name)
            .ok_or_else(|| DtError::UnsupportedRelation(name.to_string()))
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
