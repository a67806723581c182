// src/services/report_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, UserRepository},
    models::{
        auth::{Caller, UserRole},
        customer::{Customer, CustomerStatus, FOLLOWUP_LIMIT, PaidStatus},
        report::{CustomerSummary, UserWithStats},
    },
    services::{
        customer_service::visible_owner,
        policy::{self, Action, Resource},
    },
};

// Soma de dinheiro que nunca estoura em silêncio
fn add_komisi(total: i64, komisi: i64) -> Result<i64, AppError> {
    total
        .checked_add(komisi)
        .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("Soma de komisi estourou i64")))
}

/// Reduz os leads aos números do dashboard. Recalculado a cada chamada.
pub fn summarize(customers: &[Customer]) -> Result<CustomerSummary, AppError> {
    let mut summary = CustomerSummary::default();

    for customer in customers {
        summary.total_customers += 1;
        match customer.status {
            CustomerStatus::Followup => summary.followup_count += 1,
            CustomerStatus::Pemberkasan => summary.pemberkasan_count += 1,
            CustomerStatus::AkadKredit => {
                summary.akad_kredit_count += 1;
                summary.total_komisi = add_komisi(summary.total_komisi, customer.komisi)?;
                if customer.paid_status == PaidStatus::Pending {
                    summary.menunggu_pembayaran = add_komisi(summary.menunggu_pembayaran, customer.komisi)?;
                }
            }
        }
    }

    summary.followup_limit_reached = summary.followup_count >= FOLLOWUP_LIMIT;
    Ok(summary)
}

#[derive(Clone)]
pub struct ReportService {
    customer_repo: CustomerRepository,
    user_repo: UserRepository,
}

impl ReportService {
    pub fn new(customer_repo: CustomerRepository, user_repo: UserRepository) -> Self {
        Self { customer_repo, user_repo }
    }

    pub async fn get_summary(&self, pool: &PgPool, caller: &Caller) -> Result<CustomerSummary, AppError> {
        let customers = self.customer_repo.list_by_owner(pool, visible_owner(caller)).await?;
        let mut summary = summarize(&customers)?;

        if caller.is_admin() {
            // O teto não se aplica a admin
            summary.followup_limit_reached = false;
            summary.total_marketing = Some(self.user_repo.count_by_role(pool, UserRole::User).await?);
        }

        Ok(summary)
    }

    pub async fn get_marketing_stats(&self, pool: &PgPool, caller: &Caller) -> Result<Vec<UserWithStats>, AppError> {
        policy::authorize(Action::ViewMarketingReport, Resource::Global, caller)?;
        self.user_repo.list_with_stats(pool, Some(UserRole::User)).await
    }
}
