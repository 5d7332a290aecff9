use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::access_requests;
use crate::models::dto::{
    AutoriserMedecinRequest, DemanderAccesRequest, RepondreDemandeRequest, RevoquerAccesRequest,
};
use crate::services::access_service::AccessService;

fn request_json(request: &access_requests::Model) -> serde_json::Value {
    json!({
        "id": request.reference,
        "status": request.status,
        "motif": request.motif,
        "createdAt": request.created_at,
        "respondedAt": request.responded_at,
    })
}

/// GET /acces - Autorisations actives (vue patient ou médecin)
#[get("")]
pub async fn liste_acces(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let overview = AccessService::liste_acces(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// GET /acces/demandes - Demandes reçues ou envoyées
#[get("/demandes")]
pub async fn liste_demandes(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let requests = AccessService::liste_demandes(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// POST /acces/demander - Demande d'accès (MEDECIN validé)
#[post("/demander")]
pub async fn demander_acces(
    auth_user: AuthUser,
    body: web::Json<DemanderAccesRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let request =
        AccessService::demander_acces(db.get_ref(), auth_user.user_id, &body.code_patient, &body.motif).await?;
    Ok(HttpResponse::Created().json(request_json(&request)))
}

/// POST /acces/{id}/repondre - Réponse du patient
#[post("/{id}/repondre")]
pub async fn repondre_demande(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<RepondreDemandeRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let outcome =
        AccessService::repondre_demande(db.get_ref(), auth_user.user_id, &path, body.decision).await?;

    Ok(HttpResponse::Ok().json(json!({
        "demande": request_json(&outcome.request),
        "acces": outcome.grant,
    })))
}

/// POST /acces/autoriser - Autorisation directe par le patient
#[post("/autoriser")]
pub async fn autoriser_medecin(
    auth_user: AuthUser,
    body: web::Json<AutoriserMedecinRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let grant = AccessService::autoriser_medecin(
        db.get_ref(),
        auth_user.user_id,
        &body.doctor_ref,
        body.numero_dossier.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Created().json(grant))
}

/// POST /acces/revoquer - Révocation par le patient
#[post("/revoquer")]
pub async fn revoquer_acces(
    auth_user: AuthUser,
    body: web::Json<RevoquerAccesRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let revoked = AccessService::revoquer_acces(db.get_ref(), auth_user.user_id, &body.doctor_ref).await?;
    Ok(HttpResponse::Ok().json(json!({ "revoques": revoked })))
}

pub fn acces_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/acces")
            .service(liste_acces)
            .service(liste_demandes)
            .service(demander_acces)
            .service(autoriser_medecin)
            .service(revoquer_acces)
            .service(repondre_demande),
    );
}
