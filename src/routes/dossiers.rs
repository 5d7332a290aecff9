use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    CreateDossierRequest, DossierResponse, FichierResponse, RevisionResponse, UpdateDossierRequest,
    UploadFichierRequest,
};
use crate::models::{medical_records, record_files};
use crate::services::record_service::RecordService;

fn dossier_response(record: medical_records::Model, files: &[record_files::Model]) -> DossierResponse {
    DossierResponse {
        numero: record.numero,
        titre: record.title,
        contenu: record.content,
        patient_id: record.patient_id,
        cree_par: record.created_by,
        cree_le: record.created_at,
        modifie_le: record.updated_at,
        fichiers: files.iter().map(FichierResponse::from).collect(),
    }
}

/// GET /dossiers - Dossiers visibles par l'utilisateur
#[get("")]
pub async fn list_dossiers(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let records = RecordService::list_dossiers(db.get_ref(), auth_user.user_id).await?;

    let response: Vec<DossierResponse> = records
        .into_iter()
        .map(|record| dossier_response(record, &[]))
        .collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /dossiers - Créer un dossier (MEDECIN validé)
#[post("")]
pub async fn create_dossier(
    auth_user: AuthUser,
    body: web::Json<CreateDossierRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let record = RecordService::create_dossier(db.get_ref(), auth_user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(dossier_response(record, &[])))
}

/// GET /dossiers/{numero}
#[get("/{numero}")]
pub async fn get_dossier(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let (record, files) = RecordService::get_dossier(db.get_ref(), auth_user.user_id, &path).await?;
    Ok(HttpResponse::Ok().json(dossier_response(record, &files)))
}

/// PUT /dossiers/{numero} - Amender le contenu (MEDECIN autorisé)
#[put("/{numero}")]
pub async fn update_dossier(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateDossierRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let record =
        RecordService::update_dossier(db.get_ref(), auth_user.user_id, &path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(dossier_response(record, &[])))
}

/// GET /dossiers/{numero}/historique
#[get("/{numero}/historique")]
pub async fn get_historique(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let revisions = RecordService::get_historique(db.get_ref(), auth_user.user_id, &path).await?;

    let response: Vec<RevisionResponse> = revisions.iter().map(RevisionResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// POST /dossiers/{numero}/fichiers - Fichier joint en base64
#[post("/{numero}/fichiers")]
pub async fn upload_fichier(
    auth_user: AuthUser,
    path: web::Path<String>,
    body: web::Json<UploadFichierRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let file =
        RecordService::upload_fichier(db.get_ref(), auth_user.user_id, &path, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(FichierResponse::from(&file)))
}

pub fn dossiers_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dossiers")
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .service(list_dossiers)
            .service(create_dossier)
            .service(get_historique)
            .service(upload_fichier)
            .service(get_dossier)
            .service(update_dossier),
    );
}
