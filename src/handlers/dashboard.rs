// src/handlers/dashboard.rs

use axum::{Json, extract::State};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Authorize, PermViewMarketingReport},
    },
    models::report::{CustomerSummary, UserListResponse},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais sobre os clientes visíveis", body = CustomerSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<CustomerSummary>, ApiError> {
    let summary = app_state
        .report_service
        .get_summary(&app_state.db_pool, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

// GET /api/dashboard/marketing
#[utoipa::path(
    get,
    path = "/api/dashboard/marketing",
    tag = "Dashboard",
    responses(
        (status = 200, description = "AKAD_KREDIT e PEMBERKASAN por usuário", body = UserListResponse),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_marketing(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermViewMarketingReport>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = app_state
        .report_service
        .get_marketing_stats(&app_state.db_pool, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(UserListResponse { users }))
}
