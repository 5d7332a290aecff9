// ============================================================================
// SERVICE : ACCÈS (demandes + registre des autorisations)
// ============================================================================
//
// Description:
//   - demander_acces : un médecin validé demande l'accès via le code patient
//   - repondre_demande : le patient accepte (=> autorisation) ou refuse
//   - autoriser_medecin : autorisation directe par le patient
//   - revoquer_acces : le patient retire toutes les autorisations d'un médecin
//   - liste_acces / liste_demandes : vues par rôle
//
// Points d'attention:
//   - Chaque transition de statut est un UPDATE conditionnel sur le statut
//     attendu ; 0 ligne modifiée = transition perdue (NotFound)
//   - Une autorisation directe sur tous les dossiers résout à ACCEPTE les
//     demandes en attente du même médecin pour ce patient
//   - Une révocation est définitive : le médecin doit redemander l'accès
//
// ============================================================================

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDateTime, Utc};
use log::{info, warn};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{on_unique_violation, AppError, AppResult};
use crate::models::dto::UserRef;
use crate::models::enums::{Decision, GrantSource, GrantStatus, RequestStatus, Role};
use crate::models::{access_grants, access_requests, medical_records, users};
use crate::services::identity_service::IdentityService;
use crate::utils::codes;

pub struct AccessService;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: i32,
    pub nom: String,
    pub email: String,
    pub hopital: Option<String>,
}

impl From<&users::Model> for PersonSummary {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            nom: user.full_name(),
            email: user.email.clone(),
            hopital: user.hospital.clone(),
        }
    }
}

/// Une ligne de la liste des accès: un interlocuteur et les dossiers couverts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntry {
    pub personne: PersonSummary,
    pub tous_dossiers: bool,
    pub dossiers: Vec<String>,
    pub depuis: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAccessView {
    pub medecins: Vec<AccessEntry>,
    pub total_dossiers: usize,
    pub premier_acces: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAccessView {
    pub patients: Vec<AccessEntry>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AccessOverview {
    Patient(PatientAccessView),
    Medecin(DoctorAccessView),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: String,
    pub medecin: Option<PersonSummary>,
    pub patient: Option<PersonSummary>,
    pub motif: String,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
    pub responded_at: Option<NaiveDateTime>,
}

/// Résultat d'une réponse à une demande
#[derive(Debug)]
pub struct RequestOutcome {
    pub request: access_requests::Model,
    pub grant: Option<access_grants::Model>,
}

impl AccessService {
    /// Crée une demande EN_ATTENTE d'un médecin validé vers le patient
    /// désigné par son code
    pub async fn demander_acces(
        db: &DatabaseConnection,
        doctor_id: i32,
        code_patient: &str,
        motif: &str,
    ) -> AppResult<access_requests::Model> {
        // 1. Le demandeur doit être un médecin validé et actif
        let doctor = users::Entity::find_by_id(doctor_id)
            .one(db)
            .await?
            .filter(|user| user.is_practicing_doctor())
            .ok_or(AppError::Forbidden)?;

        // 2. Le code doit désigner un patient actif
        let patient = IdentityService::resolve_patient_code(db, code_patient).await?;

        let txn = db.begin().await?;

        // 3. Pas de doublon: demande en attente ou accès complet déjà actif
        let pending = access_requests::Entity::find()
            .filter(access_requests::Column::DoctorId.eq(doctor.id))
            .filter(access_requests::Column::PatientId.eq(patient.id))
            .filter(access_requests::Column::Status.eq(RequestStatus::EnAttente))
            .one(&txn)
            .await?;
        if pending.is_some() {
            return Err(AppError::AlreadyExists("Demande"));
        }
        if Self::patient_wide_grant(&txn, doctor.id, patient.id).await?.is_some() {
            return Err(AppError::AlreadyExists("Accès"));
        }

        // 4. Insertion puis référence DEM-NN dérivée de l'id
        let inserted = access_requests::ActiveModel {
            reference: Set(Uuid::new_v4().to_string()),
            doctor_id: Set(doctor.id),
            patient_id: Set(patient.id),
            motif: Set(motif.trim().to_string()),
            status: Set(RequestStatus::EnAttente),
            created_at: Set(Utc::now().naive_utc()),
            responded_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| on_unique_violation(e, "Demande"))?;

        let reference = codes::request_reference(inserted.id as u64);
        let mut active_model: access_requests::ActiveModel = inserted.into();
        active_model.reference = Set(reference);
        let request = active_model.update(&txn).await?;

        txn.commit().await?;
        info!(
            "Access request {} created by doctor {} for patient {}",
            request.reference, doctor.id, patient.id
        );
        Ok(request)
    }

    /// Réponse du patient: consomme la demande exactement une fois.
    /// ACCEPTE crée (ou réutilise) une autorisation sur tous les dossiers,
    /// dans la même transaction.
    pub async fn repondre_demande(
        db: &DatabaseConnection,
        patient_id: i32,
        reference: &str,
        decision: Decision,
    ) -> AppResult<RequestOutcome> {
        let patient = IdentityService::require_role(db, patient_id, Role::Patient).await?;

        let request = access_requests::Entity::find()
            .filter(access_requests::Column::Reference.eq(reference))
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;
        if request.patient_id != patient.id {
            warn!("Patient {} tried to answer request {} of another patient", patient.id, reference);
            return Err(AppError::Forbidden);
        }

        let txn = db.begin().await?;
        let now = Utc::now().naive_utc();

        // EN_ATTENTE -> ACCEPTE | REFUSE
        let result = access_requests::Entity::update_many()
            .col_expr(access_requests::Column::Status, Expr::value(RequestStatus::from(decision)))
            .col_expr(access_requests::Column::RespondedAt, Expr::value(now))
            .filter(access_requests::Column::Id.eq(request.id))
            .filter(access_requests::Column::Status.eq(RequestStatus::EnAttente))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Demande"));
        }

        let grant = match decision {
            Decision::Accepte => {
                let existing = Self::patient_wide_grant(&txn, request.doctor_id, patient.id).await?;
                match existing {
                    Some(grant) => Some(grant),
                    None => Some(
                        Self::insert_grant(
                            &txn,
                            request.doctor_id,
                            patient.id,
                            None,
                            GrantSource::Demande,
                            Some(request.id),
                        )
                        .await?,
                    ),
                }
            }
            Decision::Refuse => None,
        };

        let request = access_requests::Entity::find_by_id(request.id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound("Demande"))?;

        txn.commit().await?;
        info!("Access request {} answered {:?} by patient {}", request.reference, decision, patient.id);
        Ok(RequestOutcome { request, grant })
    }

    /// Autorisation directe d'un médecin par le patient, sur un dossier
    /// (numero_dossier) ou sur tous ses dossiers
    pub async fn autoriser_medecin(
        db: &DatabaseConnection,
        patient_id: i32,
        doctor_ref: &UserRef,
        numero_dossier: Option<&str>,
    ) -> AppResult<access_grants::Model> {
        let patient = IdentityService::require_role(db, patient_id, Role::Patient).await?;
        if !patient.active {
            return Err(AppError::Forbidden);
        }

        let doctor = IdentityService::find_by_ref(db, doctor_ref)
            .await?
            .filter(|user| user.is_practicing_doctor())
            .ok_or(AppError::NotFound("Médecin"))?;

        let record_id = match numero_dossier {
            Some(numero) => Some(
                medical_records::Entity::find()
                    .filter(medical_records::Column::Numero.eq(numero))
                    .filter(medical_records::Column::PatientId.eq(patient.id))
                    .one(db)
                    .await?
                    .ok_or(AppError::NotFound("Dossier"))?
                    .id,
            ),
            None => None,
        };

        let txn = db.begin().await?;

        let scope = match record_id {
            Some(id) => access_grants::Column::RecordId.eq(id),
            None => access_grants::Column::RecordId.is_null(),
        };
        let existing = access_grants::Entity::find()
            .filter(access_grants::Column::DoctorId.eq(doctor.id))
            .filter(access_grants::Column::PatientId.eq(patient.id))
            .filter(access_grants::Column::Status.eq(GrantStatus::Active))
            .filter(scope)
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::AlreadyExists("Accès"));
        }

        let grant =
            Self::insert_grant(&txn, doctor.id, patient.id, record_id, GrantSource::Direct, None).await?;

        if record_id.is_none() {
            let resolved = access_requests::Entity::update_many()
                .col_expr(access_requests::Column::Status, Expr::value(RequestStatus::Accepte))
                .col_expr(access_requests::Column::RespondedAt, Expr::value(grant.granted_at))
                .filter(access_requests::Column::DoctorId.eq(doctor.id))
                .filter(access_requests::Column::PatientId.eq(patient.id))
                .filter(access_requests::Column::Status.eq(RequestStatus::EnAttente))
                .exec(&txn)
                .await?;
            if resolved.rows_affected > 0 {
                info!("Pending request of doctor {} resolved by direct grant", doctor.id);
            }
        }

        txn.commit().await?;
        info!(
            "Doctor {} directly authorized by patient {} (record {:?})",
            doctor.id, patient.id, numero_dossier
        );
        Ok(grant)
    }

    /// ACTIVE -> REVOKED pour toutes les autorisations du médecin sur ce
    /// patient. Retourne le nombre d'autorisations révoquées.
    pub async fn revoquer_acces(
        db: &DatabaseConnection,
        patient_id: i32,
        doctor_ref: &UserRef,
    ) -> AppResult<u64> {
        let patient = IdentityService::require_role(db, patient_id, Role::Patient).await?;

        let doctor = IdentityService::find_by_ref(db, doctor_ref)
            .await?
            .ok_or(AppError::NotFound("Accès"))?;

        let result = access_grants::Entity::update_many()
            .col_expr(access_grants::Column::Status, Expr::value(GrantStatus::Revoked))
            .col_expr(access_grants::Column::RevokedAt, Expr::value(Utc::now().naive_utc()))
            .filter(access_grants::Column::DoctorId.eq(doctor.id))
            .filter(access_grants::Column::PatientId.eq(patient.id))
            .filter(access_grants::Column::Status.eq(GrantStatus::Active))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Accès"));
        }

        info!(
            "Patient {} revoked {} grant(s) of doctor {}",
            patient.id, result.rows_affected, doctor.id
        );
        Ok(result.rows_affected)
    }

    /// Autorisations ACTIVE vues par le patient (médecins autorisés) ou par
    /// le médecin (patients accessibles)
    pub async fn liste_acces(db: &DatabaseConnection, caller_id: i32) -> AppResult<AccessOverview> {
        let caller = users::Entity::find_by_id(caller_id)
            .one(db)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let (own_column, other_of): (access_grants::Column, fn(&access_grants::Model) -> i32) =
            match caller.role {
                Role::Patient => (access_grants::Column::PatientId, |g| g.doctor_id),
                Role::Medecin => (access_grants::Column::DoctorId, |g| g.patient_id),
                _ => return Err(AppError::Forbidden),
            };

        let grants = access_grants::Entity::find()
            .filter(own_column.eq(caller.id))
            .filter(access_grants::Column::Status.eq(GrantStatus::Active))
            .order_by_asc(access_grants::Column::GrantedAt)
            .all(db)
            .await?;

        let mut by_person: BTreeMap<i32, Vec<access_grants::Model>> = BTreeMap::new();
        for grant in grants {
            by_person.entry(other_of(&grant)).or_default().push(grant);
        }

        let mut entries = Vec::new();
        let mut all_records: BTreeSet<i32> = BTreeSet::new();
        for (person_id, grants) in by_person {
            let Some(person) = users::Entity::find_by_id(person_id).one(db).await? else {
                continue;
            };

            let patient_id = grants[0].patient_id;
            let tous_dossiers = grants.iter().any(|g| g.is_patient_wide());

            let mut query = medical_records::Entity::find()
                .filter(medical_records::Column::PatientId.eq(patient_id));
            if !tous_dossiers {
                let ids: Vec<i32> = grants.iter().filter_map(|g| g.record_id).collect();
                query = query.filter(medical_records::Column::Id.is_in(ids));
            }
            let records = query
                .order_by_asc(medical_records::Column::Numero)
                .all(db)
                .await?;

            all_records.extend(records.iter().map(|r| r.id));
            entries.push(AccessEntry {
                personne: PersonSummary::from(&person),
                tous_dossiers,
                dossiers: records.into_iter().map(|r| r.numero).collect(),
                depuis: grants.iter().map(|g| g.granted_at).min().unwrap_or_default(),
            });
        }

        Ok(match caller.role {
            Role::Patient => AccessOverview::Patient(PatientAccessView {
                premier_acces: entries.iter().map(|e| e.depuis).min(),
                total_dossiers: all_records.len(),
                medecins: entries,
            }),
            _ => AccessOverview::Medecin(DoctorAccessView { patients: entries }),
        })
    }

    /// Demandes reçues (patient) ou envoyées (médecin), plus récentes d'abord
    pub async fn liste_demandes(db: &DatabaseConnection, caller_id: i32) -> AppResult<Vec<RequestView>> {
        let caller = users::Entity::find_by_id(caller_id)
            .one(db)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let column = match caller.role {
            Role::Patient => access_requests::Column::PatientId,
            Role::Medecin => access_requests::Column::DoctorId,
            _ => return Err(AppError::Forbidden),
        };

        let requests = access_requests::Entity::find()
            .filter(column.eq(caller.id))
            .order_by_desc(access_requests::Column::CreatedAt)
            .order_by_desc(access_requests::Column::Id)
            .all(db)
            .await?;

        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            let (medecin, patient) = match caller.role {
                Role::Patient => (
                    users::Entity::find_by_id(request.doctor_id).one(db).await?.as_ref().map(PersonSummary::from),
                    None,
                ),
                _ => (
                    None,
                    users::Entity::find_by_id(request.patient_id).one(db).await?.as_ref().map(PersonSummary::from),
                ),
            };

            views.push(RequestView {
                id: request.reference,
                medecin,
                patient,
                motif: request.motif,
                status: request.status,
                created_at: request.created_at,
                responded_at: request.responded_at,
            });
        }

        Ok(views)
    }

    async fn patient_wide_grant<C: ConnectionTrait>(
        db: &C,
        doctor_id: i32,
        patient_id: i32,
    ) -> AppResult<Option<access_grants::Model>> {
        Ok(access_grants::Entity::find()
            .filter(access_grants::Column::DoctorId.eq(doctor_id))
            .filter(access_grants::Column::PatientId.eq(patient_id))
            .filter(access_grants::Column::RecordId.is_null())
            .filter(access_grants::Column::Status.eq(GrantStatus::Active))
            .one(db)
            .await?)
    }

    async fn insert_grant<C: ConnectionTrait>(
        db: &C,
        doctor_id: i32,
        patient_id: i32,
        record_id: Option<i32>,
        source: GrantSource,
        request_id: Option<i32>,
    ) -> AppResult<access_grants::Model> {
        access_grants::ActiveModel {
            doctor_id: Set(doctor_id),
            patient_id: Set(patient_id),
            record_id: Set(record_id),
            source: Set(source),
            request_id: Set(request_id),
            status: Set(GrantStatus::Active),
            granted_at: Set(Utc::now().naive_utc()),
            revoked_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| on_unique_violation(e, "Accès"))
    }
}
