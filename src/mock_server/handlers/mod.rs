//! HTTP request handlers for the mock server.

pub mod bom;
pub mod components;
pub mod projects;

pub use bom::*;
pub use components::*;
pub use projects::*;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::mock_server::state::MockState;

/// Paging and search parameters shared by collection endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page_size: Option<usize>,
    pub page_number: Option<usize>,
    pub search_text: Option<String>,
}

impl ListQuery {
    /// Slice one page out of `items`. Without paging parameters everything
    /// is returned.
    pub fn page<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let size = self.page_size.unwrap_or(items.len().max(1));
        let number = self.page_number.unwrap_or(1).max(1);
        items
            .iter()
            .skip((number - 1) * size)
            .take(size)
            .cloned()
            .collect()
    }
}

/// Reject the request unless it carries the configured API key.
pub(crate) fn check_auth(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(required) = &state.required_token else {
        return Ok(());
    };
    let sent = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if sent == Some(required.as_str()) {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Unauthorized", "invalid API key"))
    }
}

pub(crate) fn error(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message
        })),
    )
        .into_response()
}

pub(crate) fn not_found(what: &str, id: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        "Not found",
        &format!("No {what} found with uuid: {id}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_paging() {
        let items: Vec<u32> = (1..=5).collect();
        let all = ListQuery::default();
        assert_eq!(all.page(&items), items);

        let second = ListQuery {
            page_size: Some(2),
            page_number: Some(2),
            search_text: None,
        };
        assert_eq!(second.page(&items), vec![3, 4]);
    }
}
