// ============================================================================
// SERVICE : GARDE D'ACCÈS AUX DOSSIERS
// ============================================================================
//
// Description:
//   Point de passage unique de toute lecture ou écriture d'un dossier.
//   Décision à partir de l'état courant en base, sans cache:
//     - PATIENT : ses propres dossiers, compte actif
//     - MEDECIN : validé, actif, et autorisation ACTIVE couvrant le dossier
//       (dossier précis ou tous les dossiers du patient)
//     - ADMIN_HOPITAL / SUPER_ADMIN : jamais
//
// Points d'attention:
//   - Un refus est journalisé (warn) et ne dit pas pourquoi à l'appelant
//
// ============================================================================

use log::warn;
use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::enums::{GrantStatus, Role};
use crate::models::{access_grants, medical_records, users};

pub struct RecordGuard;

impl RecordGuard {
    /// Ok(()) si `requester` peut lire ce dossier, Forbidden sinon
    pub async fn authorize<C: ConnectionTrait>(
        db: &C,
        requester: &users::Model,
        record: &medical_records::Model,
    ) -> AppResult<()> {
        let allowed = match requester.role {
            Role::Patient => requester.active && requester.id == record.patient_id,
            Role::Medecin => {
                requester.is_practicing_doctor() && Self::active_grant(db, requester.id, record).await?
            }
            Role::AdminHopital | Role::SuperAdmin => false,
        };

        if !allowed {
            warn!(
                "Access denied: user {} ({:?}) on record {}",
                requester.id, requester.role, record.numero
            );
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    /// Seuls les médecins en exercice créent des dossiers
    pub fn authorize_creation(requester: &users::Model) -> AppResult<()> {
        if requester.is_practicing_doctor() {
            Ok(())
        } else {
            warn!("Record creation denied for user {} ({:?})", requester.id, requester.role);
            Err(AppError::Forbidden)
        }
    }

    /// Version booléenne de `authorize` à partir des identifiants
    pub async fn can_access<C: ConnectionTrait>(db: &C, requester_id: i32, record_id: i32) -> AppResult<bool> {
        let Some(requester) = users::Entity::find_by_id(requester_id).one(db).await? else {
            return Ok(false);
        };
        let record = medical_records::Entity::find_by_id(record_id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Dossier"))?;

        match Self::authorize(db, &requester, &record).await {
            Ok(()) => Ok(true),
            Err(AppError::Forbidden) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn active_grant<C: ConnectionTrait>(
        db: &C,
        doctor_id: i32,
        record: &medical_records::Model,
    ) -> AppResult<bool> {
        let grants = access_grants::Entity::find()
            .filter(access_grants::Column::DoctorId.eq(doctor_id))
            .filter(access_grants::Column::PatientId.eq(record.patient_id))
            .filter(access_grants::Column::Status.eq(GrantStatus::Active))
            .filter(
                Condition::any()
                    .add(access_grants::Column::RecordId.is_null())
                    .add(access_grants::Column::RecordId.eq(record.id)),
            )
            .all(db)
            .await?;

        Ok(grants.iter().any(|grant| grant.covers(record)))
    }
}
