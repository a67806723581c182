// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::list_users,
        handlers::users::update_role,
        handlers::users::update_profile,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::list_all_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::update_status,
        handlers::customers::update_komisi,
        handlers::customers::update_paid_status,
        handlers::customers::delete_customer,

        // --- Products ---
        handlers::products::list_public_products,
        handlers::products::get_public_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::list_lokasi,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_marketing,

        // --- Upload ---
        handlers::upload::upload_file,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Customers ---
            models::customer::CustomerStatus,
            models::customer::PaidStatus,
            models::customer::Customer,
            models::customer::CustomerOwner,
            models::customer::CustomerWithOwner,

            // --- Products ---
            models::product::Kategori,
            models::product::Product,
            models::product::ProductListResponse,
            models::product::LokasiResponse,

            // --- Reports ---
            models::report::CustomerSummary,
            models::report::UserWithStats,
            models::report::UserListResponse,

            // --- Payloads ---
            handlers::customers::CreateCustomerPayload,
            handlers::customers::UpdateCustomerPayload,
            handlers::customers::UpdateStatusPayload,
            handlers::customers::UpdateKomisiPayload,
            handlers::customers::UpdatePaidStatusPayload,
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductPayload,
            handlers::users::UpdateRolePayload,
            handlers::users::UpdateProfilePayload,
            handlers::upload::UploadResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Perfil e gestão de usuários"),
        (name = "Customers", description = "Leads e o ciclo FOLLOWUP → PEMBERKASAN → AKAD_KREDIT"),
        (name = "Products", description = "Catálogo de unidades habitacionais"),
        (name = "Dashboard", description = "Komisi e indicadores de marketing"),
        (name = "Upload", description = "Armazenamento de imagens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/customers/{id}/komisi",
            "/api/public/products",
            "/api/users",
            "/api/dashboard/summary",
            "/api/upload",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltou {path}");
        }
    }
}
