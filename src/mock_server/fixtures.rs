//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use serde_json::json;

use crate::Entity;

/// uuid of the `acme-app` project in the default scenario.
pub const APP_UUID: &str = "0b6a4f4e-8d1f-4c8e-9d6e-1a2b3c4d5e01";
/// uuid of the `acme-core` project in the default scenario.
pub const CORE_UUID: &str = "0b6a4f4e-8d1f-4c8e-9d6e-1a2b3c4d5e02";

pub const APP_PURL: &str = "pkg:maven/org.acme/acme-app@1.0.0";
pub const CORE_PURL: &str = "pkg:maven/org.acme/acme-core@2.1.0";
pub const JACKSON_PURL: &str = "pkg:maven/com.fasterxml.jackson.core/jackson-databind@2.15.2";
pub const SLF4J_PURL: &str = "pkg:maven/org.slf4j/slf4j-api@2.0.9";

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// Projects and their components.
pub struct DefaultScenario {
    pub projects: Vec<Entity>,
    pub components: Vec<(String, Vec<Entity>)>,
}

impl Fixtures {
    // =========================================================================
    // Project Fixtures
    // =========================================================================

    /// Create a minimal project with required fields only.
    pub fn minimal_project(uuid: &str, name: &str, version: &str) -> Entity {
        entity(json!({
            "uuid": uuid,
            "name": name,
            "version": version,
            "classifier": "APPLICATION",
            "active": true
        }))
    }

    /// Create a project tracked by purl, with a BOM import timestamp and a
    /// source repository reference.
    pub fn tracked_project(uuid: &str, name: &str, version: &str, purl: &str, scm: &str) -> Entity {
        let mut project = Self::minimal_project(uuid, name, version);
        project.insert("group", "org.acme");
        project.insert("purl", purl);
        project.insert("description", format!("The {name} service."));
        project.insert("lastBomImport", 1_700_000_000_000_i64);
        project.insert(
            "externalReferences",
            json!([
                {"type": "website", "url": "https://acme.example.com"},
                {"type": "vcs", "url": scm}
            ]),
        );
        project
    }

    // =========================================================================
    // Component Fixtures
    // =========================================================================

    /// A library component identified by purl.
    pub fn library(name: &str, purl: &str) -> Entity {
        entity(json!({
            "name": name,
            "purl": purl,
            "classifier": "LIBRARY"
        }))
    }

    /// A component known only by name.
    pub fn file_component(name: &str) -> Entity {
        entity(json!({
            "name": name,
            "classifier": "FILE"
        }))
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Two internal projects referencing each other.
    ///
    /// `acme-app` depends on `acme-core`, jackson and a vendored file.
    /// `acme-core` depends back on `acme-app`, on slf4j and jackson, and
    /// already carries a self-referencing component, so it can be resolved
    /// through the identity lookup. `acme-app` has none.
    pub fn default_scenario() -> DefaultScenario {
        let app = Self::tracked_project(
            APP_UUID,
            "acme-app",
            "1.0.0",
            APP_PURL,
            "https://github.com/acme/acme-app",
        );
        let core = Self::tracked_project(
            CORE_UUID,
            "acme-core",
            "2.1.0",
            CORE_PURL,
            "https://gitlab.example.com/acme/acme-core",
        );

        DefaultScenario {
            projects: vec![app, core],
            components: vec![
                (
                    APP_UUID.to_string(),
                    vec![
                        Self::library("acme-core", CORE_PURL),
                        Self::library("jackson-databind", JACKSON_PURL),
                        Self::file_component("vendored-blob.jar"),
                    ],
                ),
                (
                    CORE_UUID.to_string(),
                    vec![
                        Self::library("acme-core", CORE_PURL),
                        Self::library("acme-app", APP_PURL),
                        Self::library("slf4j-api", SLF4J_PURL),
                        Self::library("jackson-databind", JACKSON_PURL),
                    ],
                ),
            ],
        }
    }
}

fn entity(value: serde_json::Value) -> Entity {
    Entity::from_value(value).expect("fixture is a JSON object")
}
