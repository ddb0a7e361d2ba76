use crate::dtos::{GenerateResponse, GenerateTextRequest};
use crate::services::providers::{InlinePart, ProviderError};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde_json::json;
use service_core::error::AppError;

/// Prompt used by the image route when the form carries no `prompt` field.
const DEFAULT_IMAGE_PROMPT: &str = "Describe the image";
const DOCUMENT_PROMPT: &str = "Analyze this document";
const AUDIO_PROMPT: &str = "Transcribe or analyze the following audio:";

pub async fn generate_text(
    State(state): State<AppState>,
    Json(request): Json<GenerateTextRequest>,
) -> Result<Response, AppError> {
    let result = state.provider.generate(&request.prompt, None).await;
    Ok(message_envelope("text", result))
}

pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (upload, prompt) = read_upload(&state, multipart, "image").await?;
    let prompt = prompt.unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string());

    let staged = state.uploads.stage(&upload.file_name, &upload.data).await?;
    let bytes = staged.read().await?;

    // The image route always labels the part image/jpeg, whatever was uploaded.
    let part = InlinePart {
        mime_type: "image/jpeg".to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    };

    let result = state.provider.generate(&prompt, Some(&part)).await;
    Ok(message_envelope("image", result))
}

pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (upload, _) = read_upload(&state, multipart, "document").await?;

    let staged = state.uploads.stage(&upload.file_name, &upload.data).await?;
    let bytes = staged.read().await?;

    let part = InlinePart {
        mime_type: upload.mime_type,
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    };

    let result = state.provider.generate(DOCUMENT_PROMPT, Some(&part)).await;
    Ok(raw_error_envelope("document", result))
}

pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (upload, _) = read_upload(&state, multipart, "audio").await?;

    let staged = state.uploads.stage(&upload.file_name, &upload.data).await?;
    let bytes = staged.read().await?;

    let part = InlinePart {
        mime_type: upload.mime_type,
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    };

    let result = state.provider.generate(AUDIO_PROMPT, Some(&part)).await;
    Ok(message_envelope("audio", result))
}

struct FieldUpload {
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
}

/// Pull the named file field (and an optional `prompt` text field) out of a
/// multipart form. Rejects missing and oversize files before anything is
/// staged or sent to the model.
async fn read_upload(
    state: &AppState,
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(FieldUpload, Option<String>), AppError> {
    let mut upload = None;
    let mut prompt = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        if name == file_field {
            let file_name = field.file_name().unwrap_or("unnamed").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let data = field
                .bytes()
                .await
                .map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                })?
                .to_vec();

            if data.len() as u64 > state.config.upload.max_file_bytes {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "File too large (max {} bytes)",
                    state.config.upload.max_file_bytes
                )));
            }

            tracing::debug!(
                field = %name,
                filename = %file_name,
                mime_type = %mime_type,
                size = data.len(),
                "Received upload"
            );

            upload = Some(FieldUpload {
                file_name,
                mime_type,
                data,
            });
        } else if name == "prompt" {
            prompt = Some(field.text().await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read prompt field: {}", e))
            })?);
        }
    }

    let upload = upload.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Missing file field `{}`", file_field))
    })?;

    Ok((upload, prompt))
}

fn message_envelope(route: &'static str, result: Result<String, ProviderError>) -> Response {
    match result {
        Ok(output) => {
            metrics::counter!("generation_total", "route" => route, "outcome" => "ok").increment(1);
            (StatusCode::OK, Json(GenerateResponse { output })).into_response()
        }
        Err(err) => {
            metrics::counter!("generation_total", "route" => route, "outcome" => "error")
                .increment(1);
            tracing::error!(route, error = %err, "Generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// Unlike the other routes, the document route reports the provider error's
/// structured body instead of its message string; callers depend on the
/// difference.
fn raw_error_envelope(route: &'static str, result: Result<String, ProviderError>) -> Response {
    match result {
        Ok(output) => {
            metrics::counter!("generation_total", "route" => route, "outcome" => "ok").increment(1);
            (StatusCode::OK, Json(GenerateResponse { output })).into_response()
        }
        Err(err) => {
            metrics::counter!("generation_total", "route" => route, "outcome" => "error")
                .increment(1);
            tracing::error!(route, error = %err, "Generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.error_value() })),
            )
                .into_response()
        }
    }
}
