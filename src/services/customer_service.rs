// src/services/customer_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, UserRepository},
    models::{
        auth::Caller,
        customer::{
            Customer, CustomerStatus, CustomerWithOwner, DEFAULT_KOMISI, FOLLOWUP_LIMIT, PaidStatus,
            canonical_whatsapp,
        },
    },
    services::policy::{self, Action, Resource},
};

/// Leads que quem chama pode ver: admin vê todos (`None`), o resto só os próprios.
pub fn visible_owner(caller: &Caller) -> Option<Uuid> {
    if caller.is_admin() { None } else { Some(caller.user_id) }
}

/// Regra do teto de FOLLOWUP, dado quantos o dono já tem em aberto.
pub fn check_followup_capacity(open_followups: i64) -> Result<(), AppError> {
    if open_followups >= FOLLOWUP_LIMIT {
        return Err(AppError::FollowupLimitReached);
    }
    Ok(())
}

/// Komisi efetiva de um lead novo. Só admin escolhe valor diferente do padrão.
pub fn initial_komisi(caller: &Caller, requested: Option<i64>) -> i64 {
    match requested {
        Some(value) if caller.is_admin() => value,
        _ => DEFAULT_KOMISI,
    }
}

/// Komisi gravada pelo update completo. Valor ausente ou igual ao atual
/// mantém o atual; um valor novo exige a ação UpdateKomisi (admin).
pub fn resolve_komisi(caller: &Caller, existing: &Customer, requested: Option<i64>) -> Result<i64, AppError> {
    match requested {
        Some(value) if value != existing.komisi => {
            policy::authorize(Action::UpdateKomisi, Resource::Customer(existing), caller)?;
            Ok(value)
        }
        _ => Ok(existing.komisi),
    }
}

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    user_repo: UserRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, user_repo: UserRepository) -> Self {
        Self { repo, user_repo }
    }

    // Trava o dono e confere o teto dentro da mesma transação da escrita.
    // Duas criações simultâneas do mesmo ranger ficam em fila no lock.
    async fn ensure_followup_capacity(&self, conn: &mut PgConnection, owner_id: Uuid) -> Result<(), AppError> {
        self.user_repo
            .lock_for_update(&mut *conn, owner_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let open = self
            .repo
            .count_by_status(&mut *conn, owner_id, CustomerStatus::Followup)
            .await?;

        check_followup_capacity(open)
    }

    pub async fn create_customer(
        &self,
        pool: &PgPool,
        caller: &Caller,
        name: &str,
        whatsapp: &str,
        komisi: Option<i64>,
    ) -> Result<Customer, AppError> {
        policy::authorize(Action::CreateCustomer, Resource::Global, caller)?;

        let mut tx = pool.begin().await?;

        if !caller.is_admin() {
            self.ensure_followup_capacity(&mut tx, caller.user_id).await?;
        }

        let customer = self
            .repo
            .create_customer(
                &mut *tx,
                caller.user_id,
                name,
                canonical_whatsapp(whatsapp),
                initial_komisi(caller, komisi),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(customer_id = %customer.id, user_id = %caller.user_id, "Cliente criado");
        Ok(customer)
    }

    pub async fn list_customers(&self, pool: &PgPool, caller: &Caller) -> Result<Vec<CustomerWithOwner>, AppError> {
        self.repo.list_with_owner(pool, visible_owner(caller)).await
    }

    pub async fn list_all_customers(&self, pool: &PgPool, caller: &Caller) -> Result<Vec<CustomerWithOwner>, AppError> {
        policy::authorize(Action::ListAllCustomers, Resource::Global, caller)?;
        self.repo.list_with_owner(pool, None).await
    }

    pub async fn get_customer(&self, pool: &PgPool, caller: &Caller, id: Uuid) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        policy::authorize(Action::ViewCustomer, Resource::Customer(&customer), caller)?;
        Ok(customer)
    }

    /// Atualiza nome, WhatsApp, status e (só para admin) komisi.
    pub async fn update_customer(
        &self,
        pool: &PgPool,
        caller: &Caller,
        id: Uuid,
        name: &str,
        whatsapp: &str,
        komisi: Option<i64>,
        status: CustomerStatus,
    ) -> Result<Customer, AppError> {
        let mut tx = pool.begin().await?;

        let existing = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        policy::authorize(Action::UpdateCustomerFields, Resource::Customer(&existing), caller)?;

        let komisi = resolve_komisi(caller, &existing, komisi)?;

        if self.reopens_followup(caller, &existing, status) {
            self.ensure_followup_capacity(&mut tx, existing.user_id).await?;
        }

        let updated = self
            .repo
            .update_fields(&mut *tx, id, name, canonical_whatsapp(whatsapp), komisi, status)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tx.commit().await?;

        tracing::info!(customer_id = %id, user_id = %caller.user_id, "Cliente atualizado");
        Ok(updated)
    }

    pub async fn update_status(
        &self,
        pool: &PgPool,
        caller: &Caller,
        id: Uuid,
        status: CustomerStatus,
    ) -> Result<Customer, AppError> {
        let mut tx = pool.begin().await?;

        let existing = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        policy::authorize(Action::UpdateCustomerStatus, Resource::Customer(&existing), caller)?;

        if self.reopens_followup(caller, &existing, status) {
            self.ensure_followup_capacity(&mut tx, existing.user_id).await?;
        }

        let updated = self
            .repo
            .update_status(&mut *tx, id, status)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tx.commit().await?;

        tracing::info!(
            customer_id = %id,
            user_id = %caller.user_id,
            from = ?existing.status,
            to = ?status,
            "Status do cliente alterado"
        );
        Ok(updated)
    }

    pub async fn update_komisi(&self, pool: &PgPool, caller: &Caller, id: Uuid, komisi: i64) -> Result<Customer, AppError> {
        policy::authorize(Action::UpdateKomisi, Resource::Global, caller)?;

        let updated = self
            .repo
            .update_komisi(pool, id, komisi)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tracing::info!(customer_id = %id, admin_id = %caller.user_id, komisi, "Komisi alterada");
        Ok(updated)
    }

    pub async fn update_paid_status(
        &self,
        pool: &PgPool,
        caller: &Caller,
        id: Uuid,
        paid_status: PaidStatus,
    ) -> Result<Customer, AppError> {
        policy::authorize(Action::UpdatePaidStatus, Resource::Global, caller)?;

        let updated = self
            .repo
            .update_paid_status(pool, id, paid_status)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tracing::info!(customer_id = %id, admin_id = %caller.user_id, paid_status = ?paid_status, "Status de pagamento alterado");
        Ok(updated)
    }

    pub async fn delete_customer(&self, pool: &PgPool, caller: &Caller, id: Uuid) -> Result<Customer, AppError> {
        let mut tx = pool.begin().await?;

        let existing = self
            .repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        policy::authorize(Action::DeleteCustomer, Resource::Customer(&existing), caller)?;

        let deleted = self
            .repo
            .delete(&mut *tx, id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tx.commit().await?;

        tracing::info!(customer_id = %id, user_id = %caller.user_id, "Cliente excluído");
        Ok(deleted)
    }

    // Voltar um lead para FOLLOWUP conta no teto do dono; admin não tem teto
    fn reopens_followup(&self, caller: &Caller, existing: &Customer, next: CustomerStatus) -> bool {
        !caller.is_admin()
            && next == CustomerStatus::Followup
            && existing.status != CustomerStatus::Followup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;

    fn caller(role: UserRole) -> Caller {
        Caller { user_id: Uuid::new_v4(), email: "x@email.com".into(), role }
    }

    #[test]
    fn admin_sees_everything_user_sees_own() {
        let admin = caller(UserRole::Admin);
        let user = caller(UserRole::User);

        assert_eq!(visible_owner(&admin), None);
        assert_eq!(visible_owner(&user), Some(user.user_id));
    }

    #[test]
    fn tenth_followup_is_the_last_one() {
        assert!(check_followup_capacity(0).is_ok());
        assert!(check_followup_capacity(9).is_ok());
        assert!(matches!(check_followup_capacity(10), Err(AppError::FollowupLimitReached)));
        assert!(matches!(check_followup_capacity(11), Err(AppError::FollowupLimitReached)));
    }

    #[test]
    fn new_customers_default_to_one_million() {
        let user = caller(UserRole::User);
        let admin = caller(UserRole::Admin);

        assert_eq!(initial_komisi(&user, None), 1_000_000);
        // Usuário comum não escolhe a própria komisi
        assert_eq!(initial_komisi(&user, Some(5_000_000)), 1_000_000);
        assert_eq!(initial_komisi(&admin, None), 1_000_000);
        assert_eq!(initial_komisi(&admin, Some(2_500_000)), 2_500_000);
    }

    fn lead_of(owner: &Caller, status: CustomerStatus) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            name: "Siti".into(),
            whatsapp: "6281234567890".into(),
            komisi: DEFAULT_KOMISI,
            status,
            paid_status: PaidStatus::Pending,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn owner_cannot_change_own_komisi_through_core_update() {
        let user = caller(UserRole::User);
        let lead = lead_of(&user, CustomerStatus::AkadKredit);

        assert_eq!(resolve_komisi(&user, &lead, None).unwrap(), DEFAULT_KOMISI);
        // Reenviar o mesmo valor do formulário não é uma alteração
        assert_eq!(resolve_komisi(&user, &lead, Some(DEFAULT_KOMISI)).unwrap(), DEFAULT_KOMISI);
        assert!(matches!(
            resolve_komisi(&user, &lead, Some(DEFAULT_KOMISI + 1)),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(resolve_komisi(&user, &lead, Some(0)), Err(AppError::Forbidden)));
    }

    #[test]
    fn admin_owner_may_change_komisi_through_core_update() {
        let admin = caller(UserRole::Admin);
        let lead = lead_of(&admin, CustomerStatus::Followup);

        assert_eq!(resolve_komisi(&admin, &lead, None).unwrap(), DEFAULT_KOMISI);
        assert_eq!(resolve_komisi(&admin, &lead, Some(DEFAULT_KOMISI)).unwrap(), DEFAULT_KOMISI);
        assert_eq!(resolve_komisi(&admin, &lead, Some(2_500_000)).unwrap(), 2_500_000);
    }

    #[test]
    fn reopening_counts_against_the_cap_for_users_only() {
        let service = CustomerService::new(CustomerRepository::new(), UserRepository::new());
        let user = caller(UserRole::User);
        let admin = caller(UserRole::Admin);
        let lead = lead_of(&user, CustomerStatus::Pemberkasan);

        assert!(service.reopens_followup(&user, &lead, CustomerStatus::Followup));
        assert!(!service.reopens_followup(&user, &lead, CustomerStatus::AkadKredit));
        assert!(!service.reopens_followup(&admin, &lead, CustomerStatus::Followup));

        let already_followup = Customer { status: CustomerStatus::Followup, ..lead };
        assert!(!service.reopens_followup(&user, &already_followup, CustomerStatus::Followup));
    }
}
