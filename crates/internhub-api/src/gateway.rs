use std::path::Path;

use axum::{
    extract::{Request, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::AppError;
use crate::state::AppState;

const HOME_PAGE: &str = "/HTML/home.html";

/// Anything no route claimed. Paths with a file extension (and `/`) are
/// pages or assets; everything else is an unknown API call.
pub async fn fallback(State(state): State<AppState>, mut req: Request) -> Response {
    let path = req.uri().path();
    let is_asset = path == "/" || Path::new(path).extension().is_some();

    let Some(dir) = state.static_dir.as_ref().filter(|_| is_asset) else {
        return not_found().await.into_response();
    };

    if req.uri().path() == "/" {
        *req.uri_mut() = Uri::from_static(HOME_PAGE);
    }

    match ServeDir::new(dir).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound("API endpoint not found.".into())
}
