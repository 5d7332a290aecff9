// ============================================================================
// ERREURS DU DOMAINE
// ============================================================================
//
// Description:
//   Taxonomie unique des erreurs renvoyées par les services et les routes.
//   Chaque variante correspond à un code HTTP et à un code d'erreur stable
//   que le front-end utilise pour décider de la redirection.
//
// Points d'attention:
//   - Les erreurs BD et internes ne fuitent jamais leur détail au client
//   - Forbidden ne dit jamais si la ressource existe
//
// ============================================================================

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session absente ou invalide")]
    Unauthenticated,

    #[error("Email ou mot de passe invalide")]
    InvalidCredentials,

    #[error("Accès refusé")]
    Forbidden,

    #[error("{0} introuvable")]
    NotFound(&'static str),

    #[error("Patient introuvable")]
    PatientNotFound,

    #[error("{0} existe déjà")]
    AlreadyExists(&'static str),

    #[error("Ce médecin dispose déjà de droits d'administration")]
    AlreadyAdmin,

    #[error("Déjà validé")]
    AlreadyValidated,

    #[error("Données invalides")]
    Validation(#[from] ValidationErrors),

    #[error("Token expiré")]
    TokenExpired,

    #[error("Token invalide")]
    TokenInvalid,

    #[error("Confirmation requise")]
    ConfirmationRequired(serde_json::Value),

    #[error("Erreur de base de données: {0}")]
    Database(#[from] DbErr),

    #[error("Erreur interne: {0}")]
    Internal(String),
}

impl AppError {
    /// Code stable exposé dans le corps JSON
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PatientNotFound => "PATIENT_NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::AlreadyAdmin => "ALREADY_ADMIN",
            AppError::AlreadyValidated => "ALREADY_VALIDATED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::ConfirmationRequired(_) => "CONFIRMATION_REQUIRED",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::PatientNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) | AppError::AlreadyAdmin | AppError::AlreadyValidated => {
                StatusCode::CONFLICT
            }
            AppError::Validation(_) | AppError::TokenInvalid => StatusCode::BAD_REQUEST,
            AppError::TokenExpired => StatusCode::GONE,
            AppError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => json!({
                "error": self.code(),
                "message": self.to_string(),
                "fields": errors,
            }),
            AppError::ConfirmationRequired(target) => json!({
                "error": self.code(),
                "message": self.to_string(),
                "target": target,
            }),
            AppError::Database(e) => {
                log::error!("Database error: {}", e);
                json!({ "error": self.code(), "message": "Erreur de connexion au serveur" })
            }
            AppError::Internal(e) => {
                log::error!("Internal error: {}", e);
                json!({ "error": self.code(), "message": "Erreur de connexion au serveur" })
            }
            _ => json!({ "error": self.code(), "message": self.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Une violation d'unicité à l'insertion devient AlreadyExists (course
/// entre deux inscriptions, deux autorisations simultanées, ...)
pub fn on_unique_violation(e: DbErr, what: &'static str) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyExists(what),
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Dossier").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::AlreadyAdmin.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::TokenExpired.status_code(), StatusCode::GONE);
        assert_eq!(AppError::TokenInvalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_error_is_not_leaked() {
        let err = AppError::Database(DbErr::Custom("relation users does not exist".into()));
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(AppError::NotFound("Demande").to_string(), "Demande introuvable");
    }
}
