// src/common/extract.rs

use axum::{
    Json,
    extract::{FromRef, FromRequest, FromRequestParts, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// JSON desserializado e validado. Corpo malformado ou com enum desconhecido
/// vira 400 (nunca o 422 padrão do axum), no idioma do cliente.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let (mut parts, body) = req.into_parts();
        let locale = Locale::from_request_parts(&mut parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        let req = Request::from_parts(parts, body);

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            AppError::InvalidBody(rejection.body_text()).to_api_error(&locale, &app_state.i18n_store)
        })?;

        value
            .validate()
            .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

        Ok(ValidatedJson(value))
    }
}
