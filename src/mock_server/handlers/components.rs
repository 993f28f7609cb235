//! Component endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{check_auth, error, not_found, ListQuery};
use crate::mock_server::state::{Created, MockState};
use crate::Entity;

/// Query parameters for the identity lookup.
#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub purl: Option<String>,
}

/// GET /component/project/{uuid}
pub async fn list_project_components(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(project_uuid): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.project_components(&project_uuid) {
        Some(components) => (StatusCode::OK, Json(query.page(components))).into_response(),
        None => not_found("project", &project_uuid),
    }
}

/// PUT /component/project/{uuid}
pub async fn create_project_component(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(project_uuid): Path<String>,
    Json(component): Json<Entity>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.add_component(&project_uuid, component) {
        Created::Ok(component) => (StatusCode::CREATED, Json(component)).into_response(),
        Created::MissingParent => not_found("project", &project_uuid),
        Created::Duplicate => error(StatusCode::CONFLICT, "Conflict", "duplicate component"),
    }
}

/// GET /component/identity?purl=..
pub async fn component_identity(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Query(query): Query<IdentityQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    let Some(purl) = query.purl else {
        return error(StatusCode::BAD_REQUEST, "Bad request", "purl is required");
    };
    let components: Vec<Entity> = state.identity(&purl).into_iter().cloned().collect();
    (StatusCode::OK, Json(components)).into_response()
}
