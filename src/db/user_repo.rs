// src/db/user_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserRole},
        report::UserWithStats,
    },
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    // Cria um novo usuário no banco de dados (role sempre começa como USER)
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        hashed_password: &str,
        whatsapp: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, whatsapp)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .bind(whatsapp)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        whatsapp: Option<&str>,
        rekening_no: Option<&str>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, whatsapp = $3, rekening_no = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(whatsapp)
        .bind(rekening_no)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn update_role<'e, E>(&self, executor: E, id: Uuid, role: UserRole) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    /// Trava a linha do usuário até o fim da transação. Serializa as escritas
    /// que dependem de contagens por dono (limite de FOLLOWUP).
    pub async fn lock_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<UserRole>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(role)
    }

    /// Trava todas as linhas de admin e devolve quantas existem.
    pub async fn lock_admins<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role = 'ADMIN' FOR UPDATE")
            .fetch_all(executor)
            .await?;
        Ok(ids.len() as i64)
    }

    pub async fn count_by_role<'e, E>(&self, executor: E, role: UserRole) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    /// Usuários com a contagem dos seus leads em AKAD_KREDIT e PEMBERKASAN.
    /// `role = None` traz todos os usuários.
    pub async fn list_with_stats<'e, E>(&self, executor: E, role: Option<UserRole>) -> Result<Vec<UserWithStats>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, UserWithStats>(
            r#"
            SELECT
                u.id, u.name, u.email, u.whatsapp, u.role,
                COUNT(c.id) FILTER (WHERE c.status = 'AKAD_KREDIT') AS akad_kredit_count,
                COUNT(c.id) FILTER (WHERE c.status = 'PEMBERKASAN') AS pemberkasan_count
            FROM users u
            LEFT JOIN customers c ON c.user_id = u.id
            WHERE ($1::user_role IS NULL OR u.role = $1)
            GROUP BY u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .bind(role)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }
}
