// DTO des requêtes (validés avec validator avant d'atteindre les services)
// et des réponses JSON. Noms de champs en camelCase comme côté front-end.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::{Decision, Role};
use super::{record_files, record_revisions, users};

/// Désignation d'un utilisateur par id ou par email
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Id(i32),
    Email(String),
}

// ---------------------------------------------------------------------------
// Authentification / comptes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMedecinRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 200))]
    pub hospital: String,
    #[validate(length(min = 4, max = 32))]
    pub license_number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&users::Model> for UserResponse {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            role: user.role,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: i32,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&users::Model> for MeResponse {
    fn from(user: &users::Model) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub message: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCodeResponse {
    pub code_patient: String,
}

// ---------------------------------------------------------------------------
// Dossiers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDossierRequest {
    #[validate(length(min = 1, max = 200))]
    pub titre: String,
    #[validate(length(min = 1))]
    pub contenu: String,
    pub numero_dossier: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub code_patient: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDossierRequest {
    #[validate(length(min = 1, max = 200))]
    pub titre: Option<String>,
    #[validate(length(min = 1))]
    pub contenu: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadFichierRequest {
    #[validate(length(min = 1, max = 255))]
    pub nom: String,
    #[validate(length(min = 1, max = 100))]
    pub type_mime: String,
    #[validate(length(min = 1))]
    pub contenu_base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FichierResponse {
    pub nom: String,
    pub type_mime: String,
    pub taille: i64,
    pub sha256: String,
    pub depose_par: i32,
    pub depose_le: NaiveDateTime,
}

impl From<&record_files::Model> for FichierResponse {
    fn from(file: &record_files::Model) -> Self {
        Self {
            nom: file.file_name.clone(),
            type_mime: file.mime_type.clone(),
            taille: file.size_bytes,
            sha256: file.sha256.clone(),
            depose_par: file.uploaded_by,
            depose_le: file.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierResponse {
    pub numero: String,
    pub titre: String,
    pub contenu: String,
    pub patient_id: i32,
    pub cree_par: i32,
    pub cree_le: NaiveDateTime,
    pub modifie_le: NaiveDateTime,
    pub fichiers: Vec<FichierResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionResponse {
    pub version: i32,
    pub nature: super::enums::RevisionKind,
    pub titre: String,
    pub contenu: String,
    pub auteur_id: i32,
    pub date: NaiveDateTime,
}

impl From<&record_revisions::Model> for RevisionResponse {
    fn from(revision: &record_revisions::Model) -> Self {
        Self {
            version: revision.version,
            nature: revision.kind,
            titre: revision.title.clone(),
            contenu: revision.content.clone(),
            auteur_id: revision.author_id,
            date: revision.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Accès
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DemanderAccesRequest {
    #[validate(length(min = 1, max = 32))]
    pub code_patient: String,
    #[validate(length(min = 1, max = 500))]
    pub motif: String,
}

#[derive(Debug, Deserialize)]
pub struct RepondreDemandeRequest {
    pub decision: Decision,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevoquerAccesRequest {
    pub doctor_ref: UserRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoriserMedecinRequest {
    pub doctor_ref: UserRef,
    /// Absent = tous les dossiers du patient
    pub numero_dossier: Option<String>,
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRefRequest {
    pub doctor_ref: UserRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRefRequest {
    pub user_ref: UserRef,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PromoteDoctorRequest {
    pub doctor_ref: UserRef,
    #[validate(length(min = 1, max = 200))]
    pub hospital: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAdminRequest {
    pub admin_ref: UserRef,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RevokeAdminRequest {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub confirm: bool,
}
