// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{Caller, User, UserRole},
        report::UserWithStats,
    },
    services::policy::{self, Action, Resource},
};

/// Impede que a troca de cargo deixe o sistema sem nenhum admin.
pub fn check_role_change(current: UserRole, next: UserRole, admin_count: i64) -> Result<(), AppError> {
    if current == UserRole::Admin && next != UserRole::Admin && admin_count <= 1 {
        return Err(AppError::LastAdmin);
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub async fn get_profile(&self, pool: &PgPool, caller: &Caller) -> Result<User, AppError> {
        self.repo
            .find_by_id(pool, caller.user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn update_profile(
        &self,
        pool: &PgPool,
        caller: &Caller,
        name: &str,
        whatsapp: Option<&str>,
        rekening_no: Option<&str>,
    ) -> Result<User, AppError> {
        self.repo
            .update_profile(pool, caller.user_id, name, whatsapp, rekening_no)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn list_users(&self, pool: &PgPool, caller: &Caller) -> Result<Vec<UserWithStats>, AppError> {
        policy::authorize(Action::ManageUsers, Resource::Global, caller)?;
        self.repo.list_with_stats(pool, None).await
    }

    pub async fn update_role(&self, pool: &PgPool, caller: &Caller, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        policy::authorize(Action::ManageUsers, Resource::Global, caller)?;

        let mut tx = pool.begin().await?;

        // Trava os admins primeiro: duas rebaixas simultâneas não passam juntas
        let admin_count = self.repo.lock_admins(&mut *tx).await?;
        let current = self
            .repo
            .lock_for_update(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        check_role_change(current, role, admin_count)?;

        let updated = self
            .repo
            .update_role(&mut *tx, user_id, role)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            admin_id = %caller.user_id,
            from = ?current,
            to = ?role,
            "Cargo do usuário alterado"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_admin_cannot_be_demoted() {
        assert!(matches!(
            check_role_change(UserRole::Admin, UserRole::User, 1),
            Err(AppError::LastAdmin)
        ));
    }

    #[test]
    fn demotion_allowed_while_another_admin_remains() {
        assert!(check_role_change(UserRole::Admin, UserRole::User, 2).is_ok());
    }

    #[test]
    fn promotions_and_no_ops_are_always_allowed() {
        assert!(check_role_change(UserRole::User, UserRole::Admin, 1).is_ok());
        assert!(check_role_change(UserRole::User, UserRole::User, 0).is_ok());
        assert!(check_role_change(UserRole::Admin, UserRole::Admin, 1).is_ok());
    }
}
