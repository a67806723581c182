// src/models/customer.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationError;

use crate::common::error::AppError;

/// Komisi atribuída a todo lead novo.
pub const DEFAULT_KOMISI: i64 = 1_000_000;

/// Teto de komisi por lead (um trilhão). Espelha o CHECK da tabela customers.
pub const MAX_KOMISI: i64 = 1_000_000_000_000;

/// Máximo de leads em FOLLOWUP que um usuário comum pode manter ao mesmo tempo.
pub const FOLLOWUP_LIMIT: i64 = 10;

// --- ENUMS ---

// Mapeia o CREATE TYPE customer_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "customer_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Followup,
    Pemberkasan,
    AkadKredit,
}

impl FromStr for CustomerStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FOLLOWUP" => Ok(CustomerStatus::Followup),
            "PEMBERKASAN" => Ok(CustomerStatus::Pemberkasan),
            "AKAD_KREDIT" => Ok(CustomerStatus::AkadKredit),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

// Mapeia o CREATE TYPE paid_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "paid_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaidStatus {
    Pending,
    Paid,
}

impl FromStr for PaidStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(PaidStatus::Pending),
            "PAID" => Ok(PaidStatus::Paid),
            other => Err(AppError::InvalidPaidStatus(other.to_string())),
        }
    }
}

// --- CLIENTE (O Lead) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    // Dono do lead, definido na criação e nunca alterado
    pub user_id: Uuid,

    #[schema(example = "Siti Aminah")]
    pub name: String,
    #[schema(example = "6281234567890")]
    pub whatsapp: String,

    #[schema(example = 1000000)]
    pub komisi: i64,
    pub status: CustomerStatus,
    // Só tem significado depois de AKAD_KREDIT
    pub paid_status: PaidStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados do "ranger" dono do lead, vindos do JOIN com users
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOwner {
    #[sqlx(rename = "owner_name")]
    pub name: String,
    #[sqlx(rename = "owner_email")]
    pub email: String,
    #[sqlx(rename = "owner_whatsapp")]
    pub whatsapp: Option<String>,
    #[sqlx(rename = "owner_rekening_no")]
    pub rekening_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub customer: Customer,

    #[sqlx(flatten)]
    pub user: CustomerOwner,
}

// ---
// Validação Customizada
// ---

/// Número de WhatsApp: dígitos, opcionalmente com '+' na frente, 8 a 16 dígitos.
pub fn validate_whatsapp(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    let valid = (8..=16).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());

    if !valid {
        let mut err = ValidationError::new("whatsapp");
        err.message = Some("invalid_whatsapp".into());
        return Err(err);
    }
    Ok(())
}

/// Forma gravada no banco e usada na deduplicação: sem espaços nas pontas
/// e sem o '+' inicial, então "+62..." e "62..." são o mesmo número.
pub fn canonical_whatsapp(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed.strip_prefix('+').unwrap_or(trimmed)
}
