// src/models/report.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::auth::UserRole;

// Os cards do dashboard, calculados sobre os leads visíveis para quem chama
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    /// Soma da komisi dos leads em AKAD_KREDIT
    pub total_komisi: i64,
    /// Parte da total_komisi ainda não paga
    pub menunggu_pembayaran: i64,
    pub followup_count: i64,
    pub pemberkasan_count: i64,
    pub akad_kredit_count: i64,
    pub total_customers: i64,
    pub followup_limit_reached: bool,
    /// Só para admins: quantidade de usuários com role USER
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marketing: Option<i64>,
}

// Usuário com os contadores derivados dos seus leads
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithStats {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub role: UserRole,
    pub akad_kredit_count: i64,
    pub pemberkasan_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserWithStats>,
}
