// ============================================================================
// MODÈLE : PASSWORD RESET TOKENS
// ============================================================================
//
// Workflow:
//   1. POST /api/password/forgot {email} répond toujours 200
//   2. Si le compte existe, un token UUID v4 (1 heure) est créé ici
//   3. POST /api/password/reset/{token} {password}
//   4. Le token passe à used = true, le mot de passe est remplacé et toutes
//      les sessions ouvertes sont invalidées (users.session_version + 1)
//
// Points d'attention:
//   - Un token ne peut être utilisé qu'une fois (used = true)
//   - ON DELETE CASCADE: si user supprimé, tokens supprimés aussi
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "password_reset_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    #[sea_orm(unique)]
    pub token: String,

    pub expires_at: DateTime,

    pub used: bool,

    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Model {
    pub fn check_usable(&self, now: DateTime) -> Result<(), AppError> {
        if self.used {
            return Err(AppError::TokenInvalid);
        }
        if self.expires_at < now {
            return Err(AppError::TokenExpired);
        }
        Ok(())
    }
}

impl ActiveModelBehavior for ActiveModel {}
