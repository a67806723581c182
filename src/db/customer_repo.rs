// src/db/customer_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, CustomerStatus, CustomerWithOwner, PaidStatus},
};

// Colunas do dono juntadas a cada lead
const SELECT_WITH_OWNER: &str = r#"
    SELECT
        c.*,
        u.name AS owner_name,
        u.email AS owner_email,
        u.whatsapp AS owner_whatsapp,
        u.rekening_no AS owner_rekening_no
    FROM customers c
    INNER JOIN users u ON u.id = c.user_id
"#;

// A única chave única de customers (fora o id) é o WhatsApp
fn map_unique_whatsapp(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::WhatsappTaken;
        }
    }
    e.into()
}

#[derive(Clone, Default)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    /// Cria um lead em FOLLOWUP. O índice único resolve a disputa do WhatsApp.
    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        name: &str,
        whatsapp: &str,
        komisi: i64,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (user_id, name, whatsapp, komisi, status, paid_status)
            VALUES ($1, $2, $3, $4, 'FOLLOWUP', 'PENDING')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(whatsapp)
        .bind(komisi)
        .fetch_one(executor)
        .await
        .map_err(map_unique_whatsapp)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    // Mesma busca, mas trava a linha até o fim da transação
    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    /// Lista com os dados do dono, mais recentes primeiro.
    /// `owner = None` traz todos os leads (visão de admin).
    pub async fn list_with_owner<'e, E>(&self, executor: E, owner: Option<Uuid>) -> Result<Vec<CustomerWithOwner>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{SELECT_WITH_OWNER} WHERE ($1::uuid IS NULL OR c.user_id = $1) ORDER BY c.created_at DESC"
        );
        let customers = sqlx::query_as::<_, CustomerWithOwner>(&sql)
            .bind(owner)
            .fetch_all(executor)
            .await?;
        Ok(customers)
    }

    // Varredura simples usada pelos relatórios
    pub async fn list_by_owner<'e, E>(&self, executor: E, owner: Option<Uuid>) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(executor)
        .await?;
        Ok(customers)
    }

    pub async fn count_by_status<'e, E>(&self, executor: E, owner: Uuid, status: CustomerStatus) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM customers WHERE user_id = $1 AND status = $2",
        )
        .bind(owner)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        whatsapp: &str,
        komisi: i64,
        status: CustomerStatus,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $2, whatsapp = $3, komisi = $4, status = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(whatsapp)
        .bind(komisi)
        .bind(status)
        .fetch_optional(executor)
        .await
        .map_err(map_unique_whatsapp)
    }

    pub async fn update_status<'e, E>(&self, executor: E, id: Uuid, status: CustomerStatus) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn update_komisi<'e, E>(&self, executor: E, id: Uuid, komisi: i64) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET komisi = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(komisi)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn update_paid_status<'e, E>(&self, executor: E, id: Uuid, paid_status: PaidStatus) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET paid_status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(paid_status)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("DELETE FROM customers WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_unique_errors_pass_through_as_database_errors() {
        assert!(matches!(
            map_unique_whatsapp(sqlx::Error::RowNotFound),
            AppError::DatabaseError(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            map_unique_whatsapp(sqlx::Error::PoolTimedOut),
            AppError::DatabaseError(_)
        ));
    }
}
