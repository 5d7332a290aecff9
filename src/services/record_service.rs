// ============================================================================
// SERVICE : DOSSIERS MÉDICAUX
// ============================================================================
//
// Description:
//   Création, lecture, amendement, fichiers joints et historique des dossiers.
//   Chaque opération passe par RecordGuard avant de toucher au contenu.
//
// Historique:
//   - version 1 = CREATION, puis +1 par AMENDEMENT ou FICHIER
//   - les révisions ne sont jamais modifiées ni supprimées
//
// Points d'attention:
//   - Le numéro "DOS-NNN" est fourni par le médecin ou généré: premier
//     numéro libre à partir de l'id de la ligne
//   - Seul un médecin autorisé amende le contenu ; le patient peut lire
//     et joindre des fichiers
//   - Créer un dossier ne donne pas d'autorisation à son auteur
//
// ============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use log::info;
use sea_orm::*;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{on_unique_violation, AppError, AppResult};
use crate::models::dto::{CreateDossierRequest, UpdateDossierRequest, UploadFichierRequest};
use crate::models::enums::{GrantStatus, RevisionKind, Role};
use crate::models::{access_grants, medical_records, record_files, record_revisions, users};
use crate::services::identity_service::IdentityService;
use crate::services::record_guard::RecordGuard;
use crate::utils::codes;
use crate::utils::validation::field_error;

/// Taille maximale d'un fichier joint, après décodage
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

pub struct RecordService;

impl RecordService {
    /// Crée un dossier pour le patient désigné par son code
    pub async fn create_dossier(
        db: &DatabaseConnection,
        requester_id: i32,
        request: CreateDossierRequest,
    ) -> AppResult<medical_records::Model> {
        let requester = Self::load_requester(db, requester_id).await?;
        RecordGuard::authorize_creation(&requester)?;

        let numero = match request.numero_dossier.as_deref().map(str::trim) {
            Some(numero) if !numero.is_empty() => {
                if !codes::is_valid_record_number(numero) {
                    return Err(field_error("numero_dossier", "format", "Format attendu: DOS-NNN").into());
                }
                Some(numero.to_string())
            }
            _ => None,
        };

        let patient = IdentityService::resolve_patient_code(db, &request.code_patient).await?;

        let txn = db.begin().await?;
        let now = Utc::now().naive_utc();

        let inserted = medical_records::ActiveModel {
            numero: Set(numero.clone().unwrap_or_else(|| Uuid::new_v4().to_string())),
            patient_id: Set(patient.id),
            title: Set(request.titre.trim().to_string()),
            content: Set(request.contenu.clone()),
            created_by: Set(requester.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| on_unique_violation(e, "Dossier"))?;

        let record = if numero.is_none() {
            Self::assign_generated_number(&txn, inserted).await?
        } else {
            inserted
        };

        Self::append_revision(
            &txn,
            &record,
            RevisionKind::Creation,
            &record.title,
            &record.content,
            requester.id,
        )
        .await?;

        txn.commit().await?;
        info!("Record {} created by doctor {} for patient {}", record.numero, requester.id, patient.id);
        Ok(record)
    }

    /// Dossier et fichiers joints
    pub async fn get_dossier(
        db: &DatabaseConnection,
        requester_id: i32,
        numero: &str,
    ) -> AppResult<(medical_records::Model, Vec<record_files::Model>)> {
        let (_, record) = Self::authorized_record(db, requester_id, numero).await?;

        let files = record_files::Entity::find()
            .filter(record_files::Column::RecordId.eq(record.id))
            .order_by_asc(record_files::Column::UploadedAt)
            .order_by_asc(record_files::Column::Id)
            .all(db)
            .await?;

        Ok((record, files))
    }

    /// Amendement du contenu (médecin autorisé uniquement)
    pub async fn update_dossier(
        db: &DatabaseConnection,
        requester_id: i32,
        numero: &str,
        request: UpdateDossierRequest,
    ) -> AppResult<medical_records::Model> {
        let (requester, record) = Self::authorized_record(db, requester_id, numero).await?;
        if requester.role != Role::Medecin {
            return Err(AppError::Forbidden);
        }

        let txn = db.begin().await?;

        let mut active_model: medical_records::ActiveModel = record.into();
        if let Some(titre) = request.titre.as_deref() {
            active_model.title = Set(titre.trim().to_string());
        }
        active_model.content = Set(request.contenu);
        active_model.updated_at = Set(Utc::now().naive_utc());
        let record = active_model.update(&txn).await?;

        Self::append_revision(
            &txn,
            &record,
            RevisionKind::Amendement,
            &record.title,
            &record.content,
            requester.id,
        )
        .await?;

        txn.commit().await?;
        info!("Record {} amended by doctor {}", record.numero, requester.id);
        Ok(record)
    }

    /// Joint un fichier (métadonnées + empreinte SHA-256)
    pub async fn upload_fichier(
        db: &DatabaseConnection,
        requester_id: i32,
        numero: &str,
        request: UploadFichierRequest,
    ) -> AppResult<record_files::Model> {
        let (requester, record) = Self::authorized_record(db, requester_id, numero).await?;

        let bytes = STANDARD
            .decode(request.contenu_base64.trim())
            .map_err(|_| field_error("contenu_base64", "base64", "Contenu base64 invalide"))?;
        if bytes.is_empty() {
            return Err(field_error("contenu_base64", "length", "Fichier vide").into());
        }
        if bytes.len() > MAX_FILE_BYTES {
            return Err(field_error("contenu_base64", "length", "Fichier trop volumineux").into());
        }
        let sha256 = hex::encode(Sha256::digest(&bytes));

        let txn = db.begin().await?;
        let now = Utc::now().naive_utc();

        let file = record_files::ActiveModel {
            record_id: Set(record.id),
            file_name: Set(request.nom.trim().to_string()),
            mime_type: Set(request.type_mime.trim().to_string()),
            size_bytes: Set(bytes.len() as i64),
            sha256: Set(sha256),
            uploaded_by: Set(requester.id),
            uploaded_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let summary = format!("{} ({} octets, sha256 {})", file.file_name, file.size_bytes, file.sha256);
        Self::append_revision(&txn, &record, RevisionKind::Fichier, &file.file_name, &summary, requester.id)
            .await?;

        txn.commit().await?;
        info!("File {} attached to record {} by user {}", file.id, record.numero, requester.id);
        Ok(file)
    }

    /// Révisions dans l'ordre chronologique
    pub async fn get_historique(
        db: &DatabaseConnection,
        requester_id: i32,
        numero: &str,
    ) -> AppResult<Vec<record_revisions::Model>> {
        let (_, record) = Self::authorized_record(db, requester_id, numero).await?;

        Ok(record_revisions::Entity::find()
            .filter(record_revisions::Column::RecordId.eq(record.id))
            .order_by_asc(record_revisions::Column::Version)
            .all(db)
            .await?)
    }

    /// Dossiers visibles: les siens pour un patient, ceux couverts par une
    /// autorisation ACTIVE pour un médecin
    pub async fn list_dossiers(
        db: &DatabaseConnection,
        requester_id: i32,
    ) -> AppResult<Vec<medical_records::Model>> {
        let requester = Self::load_requester(db, requester_id).await?;

        let condition = match requester.role {
            Role::Patient if requester.active => {
                Condition::all().add(medical_records::Column::PatientId.eq(requester.id))
            }
            Role::Medecin if requester.is_practicing_doctor() => {
                let grants = access_grants::Entity::find()
                    .filter(access_grants::Column::DoctorId.eq(requester.id))
                    .filter(access_grants::Column::Status.eq(GrantStatus::Active))
                    .all(db)
                    .await?;
                if grants.is_empty() {
                    return Ok(Vec::new());
                }

                let mut any = Condition::any();
                for grant in &grants {
                    any = match grant.record_id {
                        Some(record_id) => any.add(medical_records::Column::Id.eq(record_id)),
                        None => any.add(medical_records::Column::PatientId.eq(grant.patient_id)),
                    };
                }
                any
            }
            _ => return Err(AppError::Forbidden),
        };

        Ok(medical_records::Entity::find()
            .filter(condition)
            .order_by_asc(medical_records::Column::Numero)
            .all(db)
            .await?)
    }

    async fn load_requester(db: &DatabaseConnection, requester_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(requester_id)
            .one(db)
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    /// Dossier inconnu -> NotFound ; connu mais refusé -> Forbidden
    async fn authorized_record(
        db: &DatabaseConnection,
        requester_id: i32,
        numero: &str,
    ) -> AppResult<(users::Model, medical_records::Model)> {
        let requester = Self::load_requester(db, requester_id).await?;
        let record = medical_records::Entity::find()
            .filter(medical_records::Column::Numero.eq(numero.trim()))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Dossier"))?;

        RecordGuard::authorize(db, &requester, &record).await?;
        Ok((requester, record))
    }

    /// Remplace le numéro provisoire par le premier "DOS-NNN" libre,
    /// en partant de l'id de la ligne
    async fn assign_generated_number(
        txn: &DatabaseTransaction,
        record: medical_records::Model,
    ) -> AppResult<medical_records::Model> {
        let mut sequence = record.id as u64;
        loop {
            let candidate = codes::record_number(sequence);
            sequence += 1;

            let taken = medical_records::Entity::find()
                .filter(medical_records::Column::Numero.eq(&candidate))
                .count(txn)
                .await?
                > 0;
            if taken {
                continue;
            }

            // numéro pris entre-temps par une autre création: seul le point
            // de sauvegarde est annulé
            let savepoint = txn.begin().await?;
            let mut active_model: medical_records::ActiveModel = record.clone().into();
            active_model.numero = Set(candidate);
            match active_model.update(&savepoint).await {
                Ok(updated) => {
                    savepoint.commit().await?;
                    return Ok(updated);
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    savepoint.rollback().await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn append_revision<C: ConnectionTrait>(
        db: &C,
        record: &medical_records::Model,
        kind: RevisionKind,
        title: &str,
        content: &str,
        author_id: i32,
    ) -> AppResult<record_revisions::Model> {
        let last = record_revisions::Entity::find()
            .filter(record_revisions::Column::RecordId.eq(record.id))
            .order_by_desc(record_revisions::Column::Version)
            .one(db)
            .await?;

        record_revisions::ActiveModel {
            record_id: Set(record.id),
            version: Set(last.map_or(1, |revision| revision.version + 1)),
            kind: Set(kind),
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            author_id: Set(author_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| on_unique_violation(e, "Révision"))
    }
}
