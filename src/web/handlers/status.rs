use axum::{extract::State, http::header, response::IntoResponse, Json};

use clips_api_structs::{Health, Welcome};
use tracing::instrument;

use crate::web::AppState;

pub async fn root() -> Json<Welcome> {
    Welcome {
        message: "Welcome to the Clips API Service".to_string(),
    }
    .into()
}

/// Reports the web server is alive.
pub async fn health() -> Json<Health> {
    Health {
        status: "healthy".to_string(),
    }
    .into()
}

/// Prometheus scrape endpoint.
#[instrument(skip(state))]
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, crate::Error> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
