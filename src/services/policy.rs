// src/services/policy.rs

//! Política de acesso única. Todo handler e todo guardião passam por
//! `authorize`, nenhum lugar compara role ou dono por conta própria.

use crate::{
    common::error::AppError,
    models::{
        auth::Caller,
        customer::{Customer, CustomerStatus},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateCustomer,
    ViewCustomer,
    ListAllCustomers,
    UpdateCustomerFields,
    UpdateCustomerStatus,
    UpdateKomisi,
    UpdatePaidStatus,
    DeleteCustomer,
    ManageProducts,
    ManageUsers,
    UploadFiles,
    ViewMarketingReport,
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Global,
    Customer(&'a Customer),
}

pub fn authorize(action: Action, resource: Resource<'_>, caller: &Caller) -> Result<(), AppError> {
    let is_admin = caller.is_admin();
    let owns = |customer: &Customer| customer.user_id == caller.user_id;

    let allowed = match (action, resource) {
        (Action::CreateCustomer, _) => true,

        (Action::ViewCustomer | Action::UpdateCustomerStatus, Resource::Customer(c)) => {
            is_admin || owns(c)
        }

        // Campos de contato são do dono, nem o admin edita lead alheio por aqui
        (Action::UpdateCustomerFields, Resource::Customer(c)) => owns(c),

        (Action::DeleteCustomer, Resource::Customer(c)) => {
            if is_admin {
                true
            } else if !owns(c) {
                false
            } else if c.status != CustomerStatus::Followup {
                // Lead em andamento fica preso para o ranger
                return Err(AppError::CustomerLocked);
            } else {
                true
            }
        }

        // Valores de dinheiro: só admin, independente de quem é o dono
        (
            Action::UpdateKomisi
            | Action::UpdatePaidStatus
            | Action::ListAllCustomers
            | Action::ManageProducts
            | Action::ManageUsers
            | Action::UploadFiles
            | Action::ViewMarketingReport,
            _,
        ) => is_admin,

        (
            Action::ViewCustomer
            | Action::UpdateCustomerStatus
            | Action::UpdateCustomerFields
            | Action::DeleteCustomer,
            Resource::Global,
        ) => false,
    };

    if allowed { Ok(()) } else { Err(AppError::Forbidden) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{auth::UserRole, customer::PaidStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn caller(role: UserRole) -> Caller {
        Caller {
            user_id: Uuid::new_v4(),
            email: "ranger@email.com".into(),
            role,
        }
    }

    fn customer_of(owner: &Caller, status: CustomerStatus) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            name: "Siti".into(),
            whatsapp: "6281234567890".into(),
            komisi: 1_000_000,
            status,
            paid_status: PaidStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_admin_touches_money_fields() {
        let owner = caller(UserRole::User);
        let admin = caller(UserRole::Admin);
        let own = customer_of(&owner, CustomerStatus::AkadKredit);

        for action in [Action::UpdateKomisi, Action::UpdatePaidStatus] {
            assert!(matches!(
                authorize(action, Resource::Customer(&own), &owner),
                Err(AppError::Forbidden)
            ));
            assert!(authorize(action, Resource::Customer(&own), &admin).is_ok());
        }
    }

    #[test]
    fn user_cannot_change_someone_elses_customer() {
        let owner = caller(UserRole::User);
        let intruder = caller(UserRole::User);
        let lead = customer_of(&owner, CustomerStatus::Followup);

        for action in [
            Action::ViewCustomer,
            Action::UpdateCustomerFields,
            Action::UpdateCustomerStatus,
            Action::DeleteCustomer,
        ] {
            assert!(matches!(
                authorize(action, Resource::Customer(&lead), &intruder),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn admin_updates_any_status_but_not_contact_fields() {
        let owner = caller(UserRole::User);
        let admin = caller(UserRole::Admin);
        let lead = customer_of(&owner, CustomerStatus::Followup);

        assert!(authorize(Action::UpdateCustomerStatus, Resource::Customer(&lead), &admin).is_ok());
        assert!(authorize(Action::UpdateCustomerFields, Resource::Customer(&lead), &admin).is_err());
        assert!(authorize(Action::UpdateCustomerFields, Resource::Customer(&lead), &owner).is_ok());
    }

    #[test]
    fn owner_cannot_delete_after_followup() {
        let owner = caller(UserRole::User);

        let fresh = customer_of(&owner, CustomerStatus::Followup);
        assert!(authorize(Action::DeleteCustomer, Resource::Customer(&fresh), &owner).is_ok());

        for status in [CustomerStatus::Pemberkasan, CustomerStatus::AkadKredit] {
            let locked = customer_of(&owner, status);
            assert!(matches!(
                authorize(Action::DeleteCustomer, Resource::Customer(&locked), &owner),
                Err(AppError::CustomerLocked)
            ));
        }
    }

    #[test]
    fn admin_deletes_unconditionally() {
        let owner = caller(UserRole::User);
        let admin = caller(UserRole::Admin);
        let locked = customer_of(&owner, CustomerStatus::AkadKredit);

        assert!(authorize(Action::DeleteCustomer, Resource::Customer(&locked), &admin).is_ok());
    }

    #[test]
    fn admin_only_global_actions() {
        let user = caller(UserRole::User);
        let admin = caller(UserRole::Admin);

        for action in [
            Action::ListAllCustomers,
            Action::ManageProducts,
            Action::ManageUsers,
            Action::UploadFiles,
            Action::ViewMarketingReport,
        ] {
            assert!(matches!(authorize(action, Resource::Global, &user), Err(AppError::Forbidden)));
            assert!(authorize(action, Resource::Global, &admin).is_ok());
        }

        assert!(authorize(Action::CreateCustomer, Resource::Global, &user).is_ok());
    }
}
