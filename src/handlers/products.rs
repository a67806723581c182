// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::ValidatedJson,
    },
    config::AppState,
    db::product_repo::{NewProduct, ProductChanges},
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Authorize, PermManageProducts},
    },
    models::product::{Kategori, LokasiResponse, Product, ProductFilter, ProductListResponse, ProductQuery},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Griya Asri Tipe 36")]
    pub title: String,
    pub detail: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
    /// Strategis, Promo ou Dp_Rendah
    pub kategori: Option<String>,
    pub lokasi: Option<String>,
    #[validate(range(min = 0, message = "invalid_amount"))]
    pub dp_akad: i64,
    #[validate(range(min = 0, message = "invalid_amount"))]
    pub fee: i64,
    #[validate(url(message = "invalid_url"))]
    pub video_link: Option<String>,
    pub image_url: Option<String>,
    pub image_url2: Option<String>,
}

// Campo ausente fica como está; `null` (ou texto em branco) limpa a coluna
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub detail: Option<Option<String>>,
    #[validate(length(min = 1, message = "required"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub kategori: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub lokasi: Option<Option<String>>,
    #[validate(range(min = 0, message = "invalid_amount"))]
    pub dp_akad: Option<i64>,
    #[validate(range(min = 0, message = "invalid_amount"))]
    pub fee: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    #[validate(url(message = "invalid_url"))]
    #[schema(value_type = Option<String>)]
    pub video_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub image_url2: Option<Option<String>>,
}

// Distingue campo ausente (None) de `null` explícito (Some(None))
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Texto opcional em branco conta como NULL, na criação e no PATCH
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clearable(field: &Option<Option<String>>) -> Option<Option<&str>> {
    field.as_ref().map(|value| non_blank(value.as_deref()))
}

fn parse_kategori(raw: Option<&str>) -> Result<Option<Kategori>, AppError> {
    non_blank(raw).map(str::parse::<Kategori>).transpose()
}

impl CreateProductPayload {
    fn to_new_product(&self) -> Result<NewProduct<'_>, AppError> {
        Ok(NewProduct {
            title: self.title.trim(),
            detail: non_blank(self.detail.as_deref()),
            description: &self.description,
            kategori: parse_kategori(self.kategori.as_deref())?,
            lokasi: non_blank(self.lokasi.as_deref()),
            dp_akad: self.dp_akad,
            fee: self.fee,
            video_link: non_blank(self.video_link.as_deref()),
            image_url: non_blank(self.image_url.as_deref()),
            image_url2: non_blank(self.image_url2.as_deref()),
        })
    }
}

impl UpdateProductPayload {
    fn to_changes(&self) -> Result<ProductChanges<'_>, AppError> {
        let kategori = match &self.kategori {
            None => None,
            Some(raw) => Some(parse_kategori(raw.as_deref())?),
        };

        Ok(ProductChanges {
            title: self.title.as_deref().map(str::trim),
            detail: clearable(&self.detail),
            description: self.description.as_deref(),
            kategori,
            lokasi: clearable(&self.lokasi),
            dp_akad: self.dp_akad,
            fee: self.fee,
            video_link: clearable(&self.video_link),
            image_url: clearable(&self.image_url),
            image_url2: clearable(&self.image_url2),
        })
    }
}

// =============================================================================
//  LEITURA
// =============================================================================

async fn list(app_state: &AppState, locale: &Locale, query: ProductQuery) -> Result<ProductListResponse, ApiError> {
    let filter = ProductFilter::try_from(query).map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    let products = app_state
        .product_service
        .list_products(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;

    Ok(ProductListResponse { products })
}

// GET /api/public/products
#[utoipa::path(
    get,
    path = "/api/public/products",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Catálogo público", body = ProductListResponse),
        (status = 400, description = "Filtro ou ordenação inválidos")
    )
)]
pub async fn list_public_products(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    Ok(Json(list(&app_state, &locale, query).await?))
}

// GET /api/public/products/{id}
#[utoipa::path(
    get,
    path = "/api/public/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_public_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .product_service
        .get_product(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Catálogo interno", body = ProductListResponse),
        (status = 400, description = "Filtro ou ordenação inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(_caller): AuthenticatedUser,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    Ok(Json(list(&app_state, &locale, query).await?))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(_caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .product_service
        .get_product(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

// GET /api/products/lokasi
#[utoipa::path(
    get,
    path = "/api/products/lokasi",
    tag = "Products",
    responses(
        (status = 200, description = "Localizações distintas, em ordem", body = LokasiResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_lokasi(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(_caller): AuthenticatedUser,
) -> Result<Json<LokasiResponse>, ApiError> {
    let lokasi = app_state
        .product_service
        .list_lokasi(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(LokasiResponse { lokasi }))
}

// =============================================================================
//  ESCRITA (ADMIN)
// =============================================================================

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermManageProducts>,
    AuthenticatedUser(caller): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let input = payload
        .to_new_product()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .create_product(&app_state.db_pool, &caller, &input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PATCH /api/products/{id}
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermManageProducts>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductPayload>,
) -> Result<Json<Product>, ApiError> {
    let changes = payload
        .to_changes()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .update_product(&app_state.db_pool, &caller, id, &changes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto excluído", body = Product),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    _: Authorize<PermManageProducts>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .product_service
        .delete_product(&app_state.db_pool, &caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}
