use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    dto::console_dto::UploadResponse,
    error::{Error, Result},
    utils::markers::image_marker,
    AppState,
};

/// Accepts one image in the `file` field and answers with the public path
/// plus the marker a reply can embed.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        let url = state.media_service.save_upload(&file_name, &data).await?;
        tracing::info!(url = %url, size = data.len(), "image uploaded");
        let marker = image_marker(&url);
        return Ok((StatusCode::CREATED, Json(UploadResponse { url, marker })));
    }

    Err(Error::BadRequest("Missing file field".into()))
}
