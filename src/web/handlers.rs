use axum::extract::{rejection::PathRejection, Path};

pub(crate) mod clip;
pub(crate) mod status;

/// Resolve the clip id from the path; an id that isn't an integer is a malformed request.
fn clip_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, crate::Error> {
    path.map(|Path(id)| id)
        .map_err(|rejection| crate::Error::Validation(rejection.body_text()))
}
