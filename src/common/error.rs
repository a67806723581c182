// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros do domínio e da infraestrutura. Cada variante tem um código de
// mensagem no catálogo i18n e um status HTTP fixo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Status inválido: {0}")]
    InvalidStatus(String),

    #[error("Status de pagamento inválido: {0}")]
    InvalidPaidStatus(String),

    #[error("Cargo inválido: {0}")]
    InvalidRole(String),

    #[error("Categoria inválida: {0}")]
    InvalidKategori(String),

    #[error("Ordenação inválida: {0}")]
    InvalidSort(String),

    #[error("Nenhum arquivo enviado")]
    MissingFile,

    #[error("WhatsApp já cadastrado")]
    WhatsappTaken,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Limite de clientes em FOLLOWUP atingido")]
    FollowupLimitReached,

    #[error("Não é possível rebaixar o último administrador")]
    LastAdmin,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Cliente já em andamento não pode ser excluído")]
    CustomerLocked,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` carrega o contexto do erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de armazenamento: {0}")]
    StorageError(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidStatus(_)
            | AppError::InvalidPaidStatus(_)
            | AppError::InvalidRole(_)
            | AppError::InvalidKategori(_)
            | AppError::InvalidSort(_)
            | AppError::MissingFile
            | AppError::WhatsappTaken
            | AppError::EmailAlreadyExists
            | AppError::FollowupLimitReached
            | AppError::LastAdmin => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::Forbidden | AppError::CustomerLocked => StatusCode::FORBIDDEN,

            AppError::UserNotFound | AppError::CustomerNotFound | AppError::ProductNotFound => {
                StatusCode::NOT_FOUND
            }

            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código da mensagem no catálogo de idiomas.
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::InvalidStatus(_) => "invalid_status",
            AppError::InvalidPaidStatus(_) => "invalid_paid_status",
            AppError::InvalidRole(_) => "invalid_role",
            AppError::InvalidKategori(_) => "invalid_kategori",
            AppError::InvalidSort(_) => "invalid_sort",
            AppError::MissingFile => "missing_file",
            AppError::WhatsappTaken => "whatsapp_taken",
            AppError::EmailAlreadyExists => "email_taken",
            AppError::FollowupLimitReached => "followup_limit",
            AppError::LastAdmin => "last_admin",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden => "forbidden",
            AppError::CustomerLocked => "customer_locked",
            AppError::UserNotFound => "user_not_found",
            AppError::CustomerNotFound => "customer_not_found",
            AppError::ProductNotFound => "product_not_found",
            _ => "internal_error",
        }
    }

    /// Converte o erro na resposta da API, já traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();

        if status.is_server_error() {
            // O detalhe fica só no log, o cliente recebe a mensagem genérica
            tracing::error!(error = %self, "Erro Interno do Servidor");
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut fields = Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, key))
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(fields))
            }
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, self.message_key()),
            details,
        }
    }
}

// Resposta de erro que vai para o fio
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos devem ser válidos")
    }

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::CustomerLocked.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::CustomerNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::WhatsappTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidPaidStatus("LATER".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_whatsapp_message_is_localized() {
        let store = store();

        let id = AppError::WhatsappTaken.to_api_error(&Locale("id".into()), &store);
        assert_eq!(id.error, "Nomor ini sudah terdaftar.");

        let en = AppError::WhatsappTaken.to_api_error(&Locale("en".into()), &store);
        assert_eq!(en.error, "This number is already registered.");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("connection refused"))
            .to_api_error(&Locale("en".into()), &store());

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error, "Internal error.");
        assert!(err.details.is_none());
    }

    #[test]
    fn validation_errors_carry_translated_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut field_error = validator::ValidationError::new("range");
        field_error.message = Some("invalid_amount".into());
        errors.add("komisi", field_error);

        let err = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let details = err.details.expect("detalhes esperados");
        assert_eq!(
            details["komisi"][0],
            "The value must be a non-negative integer."
        );
    }
}
