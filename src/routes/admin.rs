// Routes d'administration.
//   /admin/medecins, /admin/utilisateurs : ADMIN_HOPITAL (ou SUPER_ADMIN pour
//   l'activation des comptes)
//   /admin/super : SUPER_ADMIN uniquement
// Les contrôles de rôle sont faits par AdminService, sur l'état en base.

use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    DoctorRefRequest, PromoteDoctorRequest, RevokeAdminRequest, UserRef, UserRefRequest,
    ValidateAdminRequest,
};
use crate::services::admin_service::AdminService;

/// POST /admin/medecins/valider
#[post("/medecins/valider")]
pub async fn validate_doctor(
    auth_user: AuthUser,
    body: web::Json<DoctorRefRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let doctor = AdminService::validate_doctor(db.get_ref(), auth_user.user_id, &body.doctor_ref).await?;
    Ok(HttpResponse::Ok().json(doctor))
}

/// POST /admin/medecins/rejeter
#[post("/medecins/rejeter")]
pub async fn reject_doctor(
    auth_user: AuthUser,
    body: web::Json<DoctorRefRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let doctor = AdminService::reject_doctor(db.get_ref(), auth_user.user_id, &body.doctor_ref).await?;
    Ok(HttpResponse::Ok().json(doctor))
}

/// GET /admin/medecins/en-attente
#[get("/medecins/en-attente")]
pub async fn list_pending_doctors(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let doctors = AdminService::list_pending_doctors(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(doctors))
}

/// DELETE /admin/medecins/{email}
#[delete("/medecins/{email}")]
pub async fn delete_doctor(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    AdminService::delete_doctor(db.get_ref(), auth_user.user_id, &UserRef::Email(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Médecin supprimé" })))
}

/// POST /admin/utilisateurs/reactiver
#[post("/utilisateurs/reactiver")]
pub async fn reactivate_user(
    auth_user: AuthUser,
    body: web::Json<UserRefRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = AdminService::reactivate_user(db.get_ref(), auth_user.user_id, &body.user_ref).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /admin/utilisateurs/desactiver
#[post("/utilisateurs/desactiver")]
pub async fn deactivate_user(
    auth_user: AuthUser,
    body: web::Json<UserRefRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = AdminService::deactivate_user(db.get_ref(), auth_user.user_id, &body.user_ref).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /admin/super/promote
#[post("/super/promote")]
pub async fn promote_doctor(
    auth_user: AuthUser,
    body: web::Json<PromoteDoctorRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let promotion =
        AdminService::promote_doctor_to_admin(db.get_ref(), auth_user.user_id, &body.doctor_ref, &body.hospital)
            .await?;
    Ok(HttpResponse::Created().json(promotion))
}

/// POST /admin/super/validate
#[post("/super/validate")]
pub async fn validate_hospital_admin(
    auth_user: AuthUser,
    body: web::Json<ValidateAdminRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let promotion =
        AdminService::validate_hospital_admin(db.get_ref(), auth_user.user_id, &body.admin_ref).await?;
    Ok(HttpResponse::Ok().json(promotion))
}

/// POST /admin/super/revoke - en deux temps: sans "confirm", 428 + résumé
#[post("/super/revoke")]
pub async fn revoke_admin(
    auth_user: AuthUser,
    body: web::Json<RevokeAdminRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let user = AdminService::revoke_admin(db.get_ref(), auth_user.user_id, &body.email, body.confirm).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /admin/super/admins
#[get("/super/admins")]
pub async fn list_hospital_admins(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let admins = AdminService::list_hospital_admins(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(admins))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(validate_doctor)
            .service(reject_doctor)
            .service(list_pending_doctors)
            .service(delete_doctor)
            .service(reactivate_user)
            .service(deactivate_user)
            .service(promote_doctor)
            .service(validate_hospital_admin)
            .service(revoke_admin)
            .service(list_hospital_admins),
    );
}
