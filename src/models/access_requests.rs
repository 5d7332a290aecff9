// ============================================================================
// MODÈLE : ACCESS REQUESTS (demandes d'accès médecin -> patient)
// ============================================================================
//
// Machine à états:
//   EN_ATTENTE -> ACCEPTE (terminal)
//   EN_ATTENTE -> REFUSE  (terminal)
//
// Points d'attention:
//   - La transition est un UPDATE ... WHERE status = 'EN_ATTENTE' : une seule
//     réponse peut gagner, la suivante ne trouve plus de ligne
//   - Les demandes refusées restent en base pour l'audit
//   - reference au format "DEM-NN", générée à la création
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::RequestStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "access_requests")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub reference: String,
    pub doctor_id: i32,
    pub patient_id: i32,
    pub motif: String,
    pub status: RequestStatus,
    pub created_at: DateTime,
    pub responded_at: Option<DateTime>,
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
