use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use clips_api_structs::{Clip, ClipCreate, ClipStats};
use tracing::{info, instrument};

use super::clip_id;
use crate::web::{serialization::db_clips_to_api, AppState};

/// List clips known to the service
#[instrument(skip(state))]
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<Clip>>, crate::Error> {
    let clips = state.repository.list().await?;
    Ok(db_clips_to_api(clips).into())
}

/// Get a single clip by ID.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Clip>, crate::Error> {
    let id = clip_id(id)?;
    let clip: Clip = state.repository.get(id).await?.into();
    Ok(clip.into())
}

/// Create a new clip from a JSON body.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    upload: Result<Json<ClipCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Clip>), crate::Error> {
    let Json(upload) =
        upload.map_err(|rejection| crate::Error::Validation(rejection.body_text()))?;
    let clip: Clip = state.repository.create(upload.into()).await?.into();
    info!(id = clip.id, title = %clip.title, "Added clip");
    Ok((StatusCode::CREATED, clip.into()))
}

/// Count a play and relay the clip's audio to the client as an MP3 attachment.
#[instrument(skip(state))]
pub async fn stream(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, crate::Error> {
    let id = clip_id(id)?;
    let streamed = state
        .proxy
        .stream(state.repository.as_ref(), &state.metrics, id)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (header::CONTENT_DISPOSITION, streamed.content_disposition()),
    ];

    Ok((headers, streamed.audio))
}

/// Usage statistics for a single clip.
#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ClipStats>, crate::Error> {
    let id = clip_id(id)?;
    let stats: ClipStats = state.repository.stats(id).await?.into();
    Ok(stats.into())
}
