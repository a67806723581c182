// src/handlers/users.rs

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::ApiError, extract::ValidatedJson},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Authorize, PermManageUsers},
    },
    models::{
        auth::{User, UserRole},
        report::UserListResponse,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    pub user_id: Uuid,
    #[schema(example = "ADMIN")]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(custom(function = "crate::models::customer::validate_whatsapp"))]
    pub whatsapp: Option<String>,
    #[schema(example = "1234567890")]
    pub rekening_no: Option<String>,
}

// Campo opcional em branco vira NULL
fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Perfil de quem chama", body = User),
        (status = 401, description = "Sem sessão")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<User>, ApiError> {
    let user = app_state
        .user_service
        .get_profile(&app_state.db_pool, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(user))
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Usuários com os contadores de leads", body = UserListResponse),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermManageUsers>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = app_state
        .user_service
        .list_users(&app_state.db_pool, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(UserListResponse { users }))
}

// PATCH /api/users
#[utoipa::path(
    patch,
    path = "/api/users",
    tag = "Users",
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Role alterada, retorna { user }"),
        (status = 400, description = "Role inválida ou último admin"),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermManageUsers>,
    AuthenticatedUser(caller): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<UpdateRolePayload>,
) -> Result<Json<Value>, ApiError> {
    let role = payload
        .role
        .parse::<UserRole>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .update_role(&app_state.db_pool, &caller, payload.user_id, role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "user": user })))
}

// POST /api/update-profile
#[utoipa::path(
    post,
    path = "/api/update-profile",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado, retorna { success, user }"),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfilePayload>,
) -> Result<Json<Value>, ApiError> {
    let user = app_state
        .user_service
        .update_profile(
            &app_state.db_pool,
            &caller,
            payload.name.trim(),
            blank_to_none(&payload.whatsapp),
            blank_to_none(&payload.rekening_no),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "success": true, "user": user })))
}
