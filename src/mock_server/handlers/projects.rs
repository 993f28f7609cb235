//! Project endpoint handlers.

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

/// Query parameters for project lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub name: String,
    pub version: Option<String>,
}

/// GET /project
pub async fn list_projects(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    let projects: Vec<Entity> = state
        .list_projects(query.search_text.as_deref())
        .into_iter()
        .cloned()
        .collect();

    (StatusCode::OK, Json(query.page(&projects))).into_response()
}

/// PUT /project
pub async fn create_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(project): Json<Entity>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.create_project(project) {
        Created::Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Created::Duplicate => error(
            StatusCode::CONFLICT,
            "Conflict",
            "A project with the specified name already exists.",
        ),
        Created::MissingParent => error(StatusCode::BAD_REQUEST, "Bad request", "no parent"),
    }
}

/// GET /project/{uuid}
pub async fn get_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.get_project(&uuid) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found("project", &uuid),
    }
}

/// PATCH /project/{uuid}
pub async fn update_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
    Json(patch): Json<Entity>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.update_project(&uuid, patch) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found("project", &uuid),
    }
}

/// DELETE /project/{uuid}
pub async fn delete_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    if state.delete_project(&uuid) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("project", &uuid)
    }
}

/// GET /project/lookup?name=..&version=..
pub async fn lookup_project(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Query(query): Query<LookupQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.lookup_project(&query.name, query.version.as_deref()) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found("project", &query.name),
    }
}

/// GET /project/{uuid}/property
pub async fn list_project_properties(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
) -> Response {
    let state = state.read().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    match state.project_properties(&uuid) {
        Some(properties) => (StatusCode::OK, Json(properties)).into_response(),
        None => not_found("project", &uuid),
    }
}
