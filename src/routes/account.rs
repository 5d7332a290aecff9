// Routes publiques du cycle de vie des comptes (inscription, vérification
// email, mot de passe oublié) et code patient.

use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    EmailRequest, PatientCodeResponse, RegisterMedecinRequest, RegisterPatientRequest,
    ResetPasswordRequest, UserResponse, VerifyResponse,
};
use crate::models::enums::Role;
use crate::services::identity_service::IdentityService;
use crate::services::notifier::Notifier;

/// POST /patients/register (PUBLIC)
#[post("/patients/register")]
pub async fn register_patient(
    body: web::Json<RegisterPatientRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    notifier: web::Data<dyn Notifier>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let user =
        IdentityService::register_patient(db.get_ref(), config.get_ref(), notifier.get_ref(), body.into_inner())
            .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// POST /medecins/register (PUBLIC)
#[post("/medecins/register")]
pub async fn register_medecin(
    body: web::Json<RegisterMedecinRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    notifier: web::Data<dyn Notifier>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let user =
        IdentityService::register_medecin(db.get_ref(), config.get_ref(), notifier.get_ref(), body.into_inner())
            .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// GET /verify/{token} (PUBLIC)
#[get("/verify/{token}")]
pub async fn verify_email(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = IdentityService::verify_email(db.get_ref(), &path.into_inner()).await?;

    let message = match user.role {
        Role::Medecin => "Email vérifié, compte en attente de validation par votre hôpital",
        _ => "Email vérifié, vous pouvez vous connecter",
    };

    Ok(HttpResponse::Ok().json(VerifyResponse {
        message: message.to_string(),
        role: user.role,
    }))
}

/// POST /verify/resend (PUBLIC)
#[post("/verify/resend")]
pub async fn resend_verification(
    body: web::Json<EmailRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    notifier: web::Data<dyn Notifier>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    IdentityService::resend_verification(db.get_ref(), config.get_ref(), notifier.get_ref(), &body.email).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Si un compte non vérifié existe, un nouveau lien a été envoyé"
    })))
}

/// POST /password/forgot (PUBLIC)
#[post("/password/forgot")]
pub async fn forgot_password(
    body: web::Json<EmailRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    notifier: web::Data<dyn Notifier>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    IdentityService::forgot_password(db.get_ref(), config.get_ref(), notifier.get_ref(), &body.email).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Si ce compte existe, un lien de réinitialisation a été envoyé"
    })))
}

/// POST /password/reset/{token} (PUBLIC)
#[post("/password/reset/{token}")]
pub async fn reset_password(
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    IdentityService::reset_password(db.get_ref(), config.get_ref(), &path.into_inner(), &body.password).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Mot de passe réinitialisé"
    })))
}

/// GET /patients/code (PATIENT)
#[get("/patients/code")]
pub async fn get_patient_code(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let code = IdentityService::get_patient_code(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(PatientCodeResponse { code_patient: code }))
}

/// POST /patients/code/regenerer (PATIENT)
#[post("/patients/code/regenerer")]
pub async fn regenerate_patient_code(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let code = IdentityService::regenerate_patient_code(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(PatientCodeResponse { code_patient: code }))
}

pub fn account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register_patient)
        .service(register_medecin)
        .service(resend_verification)
        .service(verify_email)
        .service(forgot_password)
        .service(reset_password)
        .service(get_patient_code)
        .service(regenerate_patient_code);
}
