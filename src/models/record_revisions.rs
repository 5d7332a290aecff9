// Historique d'un dossier : journal en ajout seul, une ligne par création,
// amendement ou fichier joint. Les lignes ne sont jamais modifiées.

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::RevisionKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "record_revisions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub record_id: i32,
    pub version: i32, // 1 = création, puis +1 par entrée
    pub kind: RevisionKind,
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::medical_records::Entity",
        from = "Column::RecordId",
        to = "super::medical_records::Column::Id"
    )]
    Record,
}

impl Related<super::medical_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Record.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
