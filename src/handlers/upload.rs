// src/handlers/upload.rs

use axum::{Json, extract::{Multipart, State}};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Authorize, PermUploadFiles},
    },
};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "http://localhost:3000/uploads/6f1c...e2.jpg")]
    pub url: String,
}

// Lê o primeiro campo "file" do multipart
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidBody(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidBody(e.body_text()))?;

        if bytes.is_empty() {
            return Err(AppError::MissingFile);
        }
        return Ok((file_name, bytes.to_vec()));
    }

    Err(AppError::MissingFile)
}

// POST /api/upload
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    request_body(content_type = "multipart/form-data", description = "Campo `file` com o arquivo"),
    responses(
        (status = 200, description = "Arquivo armazenado", body = UploadResponse),
        (status = 400, description = "Nenhum arquivo enviado"),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_file(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermUploadFiles>,
    AuthenticatedUser(caller): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (file_name, bytes) = read_file_field(&mut multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let url = app_state
        .file_store
        .put(&file_name, &bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(admin_id = %caller.user_id, size = bytes.len(), %url, "📦 Arquivo enviado");
    Ok(Json(UploadResponse { url }))
}
