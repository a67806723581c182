// src/handlers/customers.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::ApiError, extract::ValidatedJson},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Authorize, PermListAllCustomers, PermUpdateKomisi, PermUpdatePaidStatus},
    },
    models::customer::{Customer, CustomerStatus, CustomerWithOwner, PaidStatus},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Siti Aminah")]
    pub name: String,

    #[validate(custom(function = "crate::models::customer::validate_whatsapp"))]
    #[schema(example = "6281234567890")]
    pub whatsapp: String,

    /// Só é respeitado quando quem cria é admin
    #[validate(range(min = 0i64, max = 1_000_000_000_000i64, message = "invalid_amount"))]
    pub komisi: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(custom(function = "crate::models::customer::validate_whatsapp"))]
    pub whatsapp: String,

    #[validate(range(min = 0i64, max = 1_000_000_000_000i64, message = "invalid_amount"))]
    pub komisi: Option<i64>,

    #[schema(example = "PEMBERKASAN")]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusPayload {
    #[schema(example = "AKAD_KREDIT")]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateKomisiPayload {
    #[validate(range(min = 0i64, max = 1_000_000_000_000i64, message = "invalid_amount"))]
    #[schema(example = 1500000)]
    pub komisi: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaidStatusPayload {
    #[schema(example = "PAID")]
    pub paid_status: String,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado em FOLLOWUP", body = Customer),
        (status = 400, description = "Dados inválidos, WhatsApp repetido ou limite de FOLLOWUP")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .customer_service
        .create_customer(
            &app_state.db_pool,
            &caller,
            payload.name.trim(),
            payload.whatsapp.trim(),
            payload.komisi,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Clientes próprios (ou todos, para admin)", body = Vec<CustomerWithOwner>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<CustomerWithOwner>>, ApiError> {
    let customers = app_state
        .customer_service
        .list_customers(&app_state.db_pool, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customers))
}

// GET /api/customers/admin
#[utoipa::path(
    get,
    path = "/api/customers/admin",
    tag = "Customers",
    responses(
        (status = 200, description = "Todos os clientes com o dono", body = Vec<CustomerWithOwner>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermListAllCustomers>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<CustomerWithOwner>>, ApiError> {
    let customers = app_state
        .customer_service
        .list_all_customers(&app_state.db_pool, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customers))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, body = Customer),
        (status = 403, description = "Cliente de outro usuário"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    let customer = app_state
        .customer_service
        .get_customer(&app_state.db_pool, &caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, body = Customer),
        (status = 400, description = "Dados inválidos ou WhatsApp repetido"),
        (status = 403, description = "Não é o dono, ou tentou mudar a komisi sem ser admin"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerPayload>,
) -> Result<Json<Customer>, ApiError> {
    let status = payload
        .status
        .parse::<CustomerStatus>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .update_customer(
            &app_state.db_pool,
            &caller,
            id,
            payload.name.trim(),
            payload.whatsapp.trim(),
            payload.komisi,
            status,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// PUT /api/customers/{id}/status
#[utoipa::path(
    put,
    path = "/api/customers/{id}/status",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, body = Customer),
        (status = 400, description = "Status inválido ou limite de FOLLOWUP"),
        (status = 403, description = "Cliente de outro usuário"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusPayload>,
) -> Result<Json<Customer>, ApiError> {
    let status = payload
        .status
        .parse::<CustomerStatus>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .update_status(&app_state.db_pool, &caller, id, status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// PUT /api/customers/{id}/komisi
#[utoipa::path(
    put,
    path = "/api/customers/{id}/komisi",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateKomisiPayload,
    responses(
        (status = 200, body = Customer),
        (status = 400, description = "Valor negativo"),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_komisi(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermUpdateKomisi>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateKomisiPayload>,
) -> Result<Json<Customer>, ApiError> {
    let customer = app_state
        .customer_service
        .update_komisi(&app_state.db_pool, &caller, id, payload.komisi)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// PUT /api/customers/{id}/paid-status
#[utoipa::path(
    put,
    path = "/api/customers/{id}/paid-status",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdatePaidStatusPayload,
    responses(
        (status = 200, body = Customer),
        (status = 400, description = "Valor diferente de PAID/PENDING"),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_paid_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermUpdatePaidStatus>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePaidStatusPayload>,
) -> Result<Json<Customer>, ApiError> {
    let paid_status = payload
        .paid_status
        .parse::<PaidStatus>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .update_paid_status(&app_state.db_pool, &caller, id, paid_status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente excluído", body = Customer),
        (status = 403, description = "Cliente de outro usuário ou já além de FOLLOWUP"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError> {
    let customer = app_state
        .customer_service
        .delete_customer(&app_state.db_pool, &caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::MAX_KOMISI;

    #[test]
    fn create_payload_rejects_bad_whatsapp_and_negative_komisi() {
        let payload: CreateCustomerPayload =
            serde_json::from_str(r#"{"name":"Siti","whatsapp":"abc","komisi":-5}"#).unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("whatsapp"));
        assert!(fields.contains_key("komisi"));
    }

    #[test]
    fn create_payload_komisi_is_optional() {
        let payload: CreateCustomerPayload =
            serde_json::from_str(r#"{"name":"Siti","whatsapp":"6281234567890"}"#).unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.komisi, None);
    }

    #[test]
    fn paid_status_payload_uses_camel_case() {
        let payload: UpdatePaidStatusPayload = serde_json::from_str(r#"{"paidStatus":"PAID"}"#).unwrap();
        assert_eq!(payload.paid_status.parse::<PaidStatus>().unwrap(), PaidStatus::Paid);
    }

    #[test]
    fn komisi_above_the_cap_is_rejected_everywhere() {
        let komisi: UpdateKomisiPayload =
            serde_json::from_value(serde_json::json!({ "komisi": i64::MAX })).unwrap();
        assert!(komisi.validate().unwrap_err().field_errors().contains_key("komisi"));

        let create: CreateCustomerPayload = serde_json::from_value(
            serde_json::json!({ "name": "Siti", "whatsapp": "6281234567890", "komisi": MAX_KOMISI + 1 }),
        )
        .unwrap();
        assert!(create.validate().is_err());

        let update: UpdateCustomerPayload = serde_json::from_value(serde_json::json!({
            "name": "Siti", "whatsapp": "6281234567890", "komisi": i64::MAX, "status": "FOLLOWUP"
        }))
        .unwrap();
        assert!(update.validate().is_err());
    }

    #[test]
    fn komisi_at_the_cap_is_accepted() {
        let komisi: UpdateKomisiPayload =
            serde_json::from_value(serde_json::json!({ "komisi": MAX_KOMISI })).unwrap();
        assert!(komisi.validate().is_ok());
    }
}
