use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
};
use tracing::instrument;

use crate::{
    AppState,
    errors::{Error, Result},
    materializer::MultipartReader,
};

#[utoipa::path(
    post,
    path = "/bytes-in-body/asynchronous-save-file",
    tag = "uploads",
    summary = "Stream a body to disk",
    description = "Copies the body chunk by chunk into the configured upload file, replacing any previous content.",
    request_body(content_type = "application/octet-stream", description = "Raw bytes to store"),
    responses(
        (status = 200, description = "Where the file was written and whether it exists", body = String, content_type = "text/plain"),
        (status = 500, description = "The body could not be written")
    )
)]
#[instrument(skip_all)]
pub async fn save_file(State(state): State<AppState>, body: Body) -> Result<String> {
    let stored = state
        .materializer
        .save(body.into_data_stream(), &state.config.uploads.stream_file_name)
        .await?;

    Ok(format!("File uploaded to: {}\nFile exists: {}", stored.path.display(), stored.exists))
}

#[utoipa::path(
    post,
    path = "/multipart-form-data",
    tag = "uploads",
    summary = "Upload files with a multipart form",
    description = "Form fields are read inline up to the configured limit. File parts are streamed to disk under \
                   their original file name. The value of the last inline field is echoed back as the description.",
    request_body(
        content_type = "multipart/form-data",
        description = "A description field plus one or more file fields"
    ),
    responses(
        (status = 200, description = "Description, stored path and existence check", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing multipart content type or unsafe file name"),
        (status = 413, description = "An inline field exceeded the configured limit"),
        (status = 500, description = "The multipart stream could not be parsed or a file could not be written")
    )
)]
#[instrument(skip_all)]
pub async fn multipart_form_data(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Result<String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::malformed("Expected a multipart/form-data content type"))?;
    let boundary = MultipartReader::boundary(content_type)?;

    let upload = state
        .materializer
        .materialize_multipart(body.into_data_stream(), boundary)
        .await?;

    let stored_path = upload
        .stored_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    Ok(format!(
        "{} is uploaded to: {}\nFile exists: {}",
        upload.description, stored_path, upload.exists
    ))
}
