use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use std::path::Component;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::state::AppState;

/// Serves `filename` from the first configured static directory that has it.
///
/// Development only: there is no caching policy and no access control.
pub async fn serve_static(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    // the route decodes %2F, so the name may still carry separators
    if !is_bare_file_name(&filename) {
        return StatusCode::NOT_FOUND.into_response();
    }

    for dir in state.static_dirs() {
        let path = dir.join(&filename);
        let is_file = tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_file());

        if is_file {
            return match ServeFile::new(path).oneshot(request).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            };
        }
    }

    StatusCode::NOT_FOUND.into_response()
}

/// True when `filename` names an entry directly inside a directory.
fn is_bare_file_name(filename: &str) -> bool {
    let mut components = std::path::Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
