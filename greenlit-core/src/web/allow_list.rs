// File: greenlit-core/src/web/allow_list.rs

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::web::AppState;

/// `GET /whitelist/{system}`: newline-separated Roblox ids as plain text.
pub async fn handle_get_allow_list(
    State(state): State<AppState>,
    Path(system): Path<String>,
) -> Response {
    let Some(system) = state.catalog.find(&system) else {
        return (StatusCode::NOT_FOUND, "No such system").into_response();
    };

    match state.allow_lists.entries(system).await {
        Ok(Some(ids)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            ids.join("\n"),
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Whitelist file not found").into_response(),
        Err(e) => {
            error!("Failed to read allow-list for '{}': {}", system.name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read whitelist").into_response()
        }
    }
}
