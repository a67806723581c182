// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    services::policy::{self, Action, Resource},
};

/// Ação global protegida pela política de acesso
pub trait ActionDef: Send + Sync + 'static {
    fn action() -> Action;
}

/// Guardião: só deixa o handler rodar se a política autorizar a ação
pub struct Authorize<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for Authorize<T>
where
    T: ActionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(caller) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if let Err(denied) = policy::authorize(T::action(), Resource::Global, &caller) {
            let app_state = AppState::from_ref(state);
            let locale = Locale::from_request_parts(parts, state)
                .await
                .unwrap_or_else(|never| match never {});
            tracing::warn!(user_id = %caller.user_id, action = ?T::action(), "Acesso negado");
            return Err(denied.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(Authorize(PhantomData))
    }
}

// ---
// AÇÕES PROTEGIDAS (TIPOS)
// ---

pub struct PermListAllCustomers;
impl ActionDef for PermListAllCustomers {
    fn action() -> Action { Action::ListAllCustomers }
}

pub struct PermUpdateKomisi;
impl ActionDef for PermUpdateKomisi {
    fn action() -> Action { Action::UpdateKomisi }
}

pub struct PermUpdatePaidStatus;
impl ActionDef for PermUpdatePaidStatus {
    fn action() -> Action { Action::UpdatePaidStatus }
}

pub struct PermManageProducts;
impl ActionDef for PermManageProducts {
    fn action() -> Action { Action::ManageProducts }
}

pub struct PermManageUsers;
impl ActionDef for PermManageUsers {
    fn action() -> Action { Action::ManageUsers }
}

pub struct PermUploadFiles;
impl ActionDef for PermUploadFiles {
    fn action() -> Action { Action::UploadFiles }
}

pub struct PermViewMarketingReport;
impl ActionDef for PermViewMarketingReport {
    fn action() -> Action { Action::ViewMarketingReport }
}
