use axum::body::Body;

use crate::{
    api::models::echo::EchoRecord,
    errors::Result,
    materializer::{decode_bytes, decode_form, decode_object, decode_text, lossy_text},
};

#[utoipa::path(
    post,
    path = "/text-in-body",
    tag = "bodies",
    summary = "Echo a text body",
    request_body(content_type = "text/plain", description = "Any UTF-8 text"),
    responses(
        (status = 200, description = "The echoed text", body = String, content_type = "text/plain"),
        (status = 400, description = "Body is not valid UTF-8")
    )
)]
pub async fn text_in_body(body: Body) -> Result<String> {
    let text = decode_text(body.into_data_stream()).await?;
    Ok(format!("text in body is: {text}"))
}

#[utoipa::path(
    post,
    path = "/bytes-in-body",
    tag = "bodies",
    summary = "Echo a binary body as text",
    description = "Invalid UTF-8 sequences are replaced with U+FFFD.",
    request_body(content_type = "application/octet-stream", description = "Raw bytes"),
    responses(
        (status = 200, description = "The bytes reinterpreted as text", body = String, content_type = "text/plain")
    )
)]
pub async fn bytes_in_body(body: Body) -> Result<String> {
    let bytes = decode_bytes(body.into_data_stream()).await?;
    Ok(lossy_text(&bytes))
}

#[utoipa::path(
    post,
    path = "/bytes-in-body/asynchronous",
    tag = "bodies",
    summary = "Read a binary body incrementally",
    request_body(content_type = "application/octet-stream", description = "Raw bytes, read chunk by chunk"),
    responses(
        (status = 200, description = "The bytes reinterpreted as text", body = String, content_type = "text/plain")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn bytes_in_body_asynchronous(body: Body) -> Result<String> {
    let bytes = decode_bytes(body.into_data_stream()).await?;
    Ok(format!("text in body is: {}", lossy_text(&bytes)))
}

#[utoipa::path(
    post,
    path = "/object-in-body",
    tag = "bodies",
    summary = "Decode a JSON object",
    request_body(content = EchoRecord, content_type = "application/json"),
    responses(
        (status = 200, description = "The decoded object", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed JSON or missing required fields")
    )
)]
pub async fn object_in_body(body: Body) -> Result<String> {
    let record: EchoRecord = decode_object(body.into_data_stream()).await?;
    Ok(format!("object is received: {record}"))
}

#[utoipa::path(
    post,
    path = "/form-parameters",
    tag = "bodies",
    summary = "Echo url-encoded form parameters",
    description = "Pairs are echoed in the order they were sent; repeated keys are kept.",
    request_body(content_type = "application/x-www-form-urlencoded", description = "Any form fields"),
    responses(
        (status = 200, description = "The decoded pairs", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed form body")
    )
)]
pub async fn form_parameters(body: Body) -> Result<String> {
    let pairs = decode_form(body.into_data_stream()).await?;
    let rendered = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("form parameters: {rendered}"))
}
