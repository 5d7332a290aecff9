use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::PromotionStatus;

/// Promotion d'un médecin au rôle ADMIN_HOPITAL pour un hôpital donné.
///
/// Les droits d'administration ne sont effectifs qu'une fois la promotion
/// VALIDATED. Une révocation passe la ligne à REVOKED (historique conservé) ;
/// une nouvelle promotion crée une nouvelle ligne.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_promotions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub doctor_id: i32,
    pub hospital: String,
    pub status: PromotionStatus,
    pub created_at: DateTime,
    pub validated_at: Option<DateTime>,
    pub revoked_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
