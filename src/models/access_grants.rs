// ============================================================================
// MODÈLE : ACCESS GRANTS (registre des autorisations)
// ============================================================================
//
// Description:
//   Une ligne = un médecin autorisé sur les dossiers d'un patient, soit sur
//   un dossier précis (record_id), soit sur tous ses dossiers (record_id NULL).
//
// Création:
//   - acceptation d'une demande (source = DEMANDE, request_id renseigné)
//   - autorisation directe par le patient (source = DIRECT)
//
// Points d'attention:
//   - Au plus une ligne ACTIVE par (doctor_id, patient_id, record_id) :
//     index unique partiel uq_access_grants_active (voir db::create_schema)
//   - ACTIVE -> REVOKED est définitif, une nouvelle autorisation crée une
//     nouvelle ligne
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::{GrantSource, GrantStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_grants")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub doctor_id: i32,
    pub patient_id: i32,
    pub record_id: Option<i32>, // NULL = tous les dossiers du patient
    pub source: GrantSource,
    pub request_id: Option<i32>,
    pub status: GrantStatus,
    pub granted_at: DateTime,
    pub revoked_at: Option<DateTime>,
}

impl Model {
    pub fn is_patient_wide(&self) -> bool {
        self.record_id.is_none()
    }

    /// Vrai si cette autorisation couvre le dossier donné
    pub fn covers(&self, record: &super::medical_records::Model) -> bool {
        self.status == GrantStatus::Active
            && self.patient_id == record.patient_id
            && self.record_id.is_none_or(|id| id == record.id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PatientId",
        to = "super::users::Column::Id"
    )]
    Patient,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
