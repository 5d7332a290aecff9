use actix_web::cookie::{Cookie, SameSite};
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::{AuthUser, SESSION_COOKIE};
use crate::models::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, MeResponse, UserResponse};
use crate::services::identity_service::IdentityService;

/// POST /auth/login - Se connecter (PUBLIC)
/// Le token est renvoyé dans le corps et dans un cookie HttpOnly.
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let session = IdentityService::login(db.get_ref(), config.get_ref(), &body.email, &body.password).await?;

    let cookie = Cookie::build(SESSION_COOKIE, session.token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(actix_web::cookie::time::Duration::hours(config.session_ttl_hours))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        token: session.token,
        user: UserResponse::from(&session.user),
    }))
}

/// GET /auth/me - Utilisateur de la session (PROTÉGÉ)
#[get("/me")]
pub async fn me(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = IdentityService::get_me(db.get_ref(), auth_user.user_id, auth_user.session_version).await?;
    Ok(HttpResponse::Ok().json(MeResponse::from(&user)))
}

/// POST /auth/logout - Invalide toutes les sessions (PROTÉGÉ)
#[post("/logout")]
pub async fn logout(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    IdentityService::logout(db.get_ref(), auth_user.user_id).await?;

    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    Ok(HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "message": "Déconnecté"
    })))
}

/// POST /auth/change-password - Changer le mot de passe (PROTÉGÉ)
#[post("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    IdentityService::change_password(
        db.get_ref(),
        config.get_ref(),
        auth_user.user_id,
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Mot de passe modifié"
    })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(me)
            .service(logout)
            .service(change_password),
    );
}
