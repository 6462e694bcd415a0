use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::AppError;
use crate::services::file_store::content_type_for;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    params(
        ("filename" = String, Path, description = "Stored image filename")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "Unknown file or a name outside the upload directory")
    ),
    tag = "Shop"
)]
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state
        .catalog()
        .files()
        .read(&filename)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&filename)),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        bytes,
    ))
}
