use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clips_api_structs::ErrorBody;
use tower::ServiceBuilder;
use tower_http::{
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit, ServiceBuilderExt,
};
use tracing::{error, Level};

use crate::{config::Config, db::ClipRepository, metrics::Metrics, stream::StreamProxy, Error};

pub(crate) mod handlers;
pub(crate) mod serialization;

use handlers::{clip, status};

/// Everything a request handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ClipRepository>,
    pub proxy: StreamProxy,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config, repository: Arc<dyn ClipRepository>) -> Result<Self, Error> {
        Ok(Self {
            repository,
            proxy: StreamProxy::new(config.stream_timeout())?,
            metrics: Metrics::new()?,
        })
    }
}

/// Build the HTTP API; clip routes are mounted under the configured prefix.
pub fn create_router(config: &Config, state: AppState) -> Router {
    let clips = format!("{}/clips", config.api_prefix());

    let app = Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        .route("/metrics", get(status::metrics))
        .route(&clips, get(clip::get_all).post(clip::create))
        .route(&format!("{clips}/"), get(clip::get_all).post(clip::create))
        .route(&format!("{clips}/:id"), get(clip::get))
        .route(&format!("{clips}/:id/stream"), get(clip::stream))
        .route(&format!("{clips}/:id/stats"), get(clip::stats))
        .fallback(handle_404)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::metrics::track_requests,
        ));

    // Ordering matters here; requests pass through middleware top-to-bottom and responses bottom-to-top
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .propagate_x_request_id();

    app.layer(middleware).with_state(state)
}

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "This isn't the endpoint you're looking for".to_string(),
        }),
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(err = ?self, "Request failed");
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
