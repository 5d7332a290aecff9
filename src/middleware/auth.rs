use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use log::{debug, error};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::enums::Role;
use crate::services::identity_service::IdentityService;
use crate::utils::jwt;

/// Cookie de session posé par /auth/login
pub const SESSION_COOKIE: &str = "healthsafe_session";

/// Utilisateur authentifié, extrait du JWT puis relu en base.
/// Utilisé comme extracteur dans les routes protégées.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
    pub session_version: i32,
}

/// Token de la requête: header "Authorization: Bearer <token>" ou cookie
fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(header) = req.headers().get("Authorization") {
        let value = header.to_str().ok()?;
        return value.strip_prefix("Bearer ").map(|token| token.trim().to_string());
    }

    req.cookie(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
}

/// Implémentation de FromRequest pour AuthUser.
/// Le token doit être valide ET sa version de session égale à celle en base
/// (déconnexion, changement de rôle ou de mot de passe l'invalident).
impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_token(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();
        let config = req.app_data::<web::Data<AppConfig>>().cloned();

        Box::pin(async move {
            let (Some(db), Some(config)) = (db, config) else {
                error!("AuthUser extractor used without database or config app data");
                return Err(AppError::Internal("missing app data".to_string()));
            };

            let token = token.ok_or(AppError::Unauthenticated)?;
            let claims = jwt::verify_token(&config.jwt_secret, &token).map_err(|e| {
                debug!("Rejected session token: {}", e);
                AppError::Unauthenticated
            })?;

            let user = IdentityService::get_me(db.get_ref(), claims.sub, claims.ver).await?;

            Ok(AuthUser {
                user_id: user.id,
                role: user.role,
                session_version: user.session_version,
            })
        })
    }
}
