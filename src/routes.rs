// src/routes.rs

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers::{self, upload::MAX_UPLOAD_BYTES},
    middleware::auth::auth_guard,
};

pub fn build_router(app_state: AppState, upload_dir: &Path) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let public_product_routes = Router::new()
        .route("/", get(handlers::products::list_public_products))
        .route("/{id}", get(handlers::products::get_public_product));

    // Rotas protegidas pelo auth_guard
    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::users::list_users).patch(handlers::users::update_role),
        )
        .route("/me", get(handlers::users::get_me));

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route("/admin", get(handlers::customers::list_all_customers))
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route("/{id}/status", put(handlers::customers::update_status))
        .route("/{id}/komisi", put(handlers::customers::update_komisi))
        .route("/{id}/paid-status", put(handlers::customers::update_paid_status));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/lokasi", get(handlers::products::list_lokasi))
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .patch(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/marketing", get(handlers::dashboard::get_marketing));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/customers", customer_routes)
        .nest("/products", product_routes)
        .nest("/dashboard", dashboard_routes)
        .route("/update-profile", post(handlers::users::update_profile))
        .route(
            "/upload",
            post(handlers::upload::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/public/products", public_product_routes)
        .nest("/api", protected_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Settings;

    // Pool preguiçoso: nenhuma destas rotas chega a tocar no banco
    fn test_router() -> Router {
        let settings = Settings::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&settings.database_url)
            .unwrap();
        let state = AppState::with_pool(&settings, pool).unwrap();
        build_router(state, &settings.upload_dir)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let response = test_router()
            .oneshot(Request::get("/api/customers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized_in_the_requested_language() {
        let request = Request::post("/api/customers")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Siti","whatsapp":"6281234567890"}"#))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized.");
    }

    #[tokio::test]
    async fn malformed_login_body_is_bad_request() {
        let request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_register_fields_are_reported_per_field() {
        let request = Request::post("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"","email":"nope","password":"123"}"#))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["details"]["email"].is_array());
        assert!(body["details"]["password"].is_array());
    }

    #[tokio::test]
    async fn unknown_sort_key_is_bad_request_on_public_catalog() {
        let response = test_router()
            .oneshot(
                Request::get("/api/public/products?sortBy=price")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
