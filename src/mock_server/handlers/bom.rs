//! BOM upload handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{check_auth, error};
use crate::mock_server::state::MockState;

/// PUT /bom
pub async fn upload_bom(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.write().await;
    if let Err(denied) = check_auth(&state, &headers) {
        return denied;
    }

    if body.get("bom").and_then(Value::as_str).is_none() {
        return error(StatusCode::BAD_REQUEST, "Bad request", "bom is required");
    }
    let has_target = body.get("project").is_some()
        || (body.get("projectName").is_some() && body.get("projectVersion").is_some());
    if !has_target {
        return error(
            StatusCode::BAD_REQUEST,
            "Bad request",
            "project or projectName/projectVersion is required",
        );
    }

    let token = state.upload_bom(body);
    (StatusCode::OK, Json(json!({ "token": token }))).into_response()
}
