// ============================================================================
// MODÈLE : EMAIL VERIFICATION TOKENS
// ============================================================================
//
// Description:
//   Tokens à usage unique envoyés à l'inscription d'un patient ou d'un médecin.
//
// Colonnes de la table email_verification_tokens:
//   - id (INTEGER, PRIMARY KEY)
//   - user_id (INTEGER, NOT NULL, FK vers users, ON DELETE CASCADE)
//   - token (VARCHAR, UNIQUE, NOT NULL) - UUID v4
//   - expires_at (TIMESTAMP, NOT NULL) - created_at + 24 heures
//   - used (BOOLEAN, NOT NULL)
//   - created_at (TIMESTAMP, NOT NULL)
//
// Workflow:
//   1. POST /api/patients/register ou /api/medecins/register
//   2. Le user est créé avec verified = false
//   3. Un token est inséré ici et transmis au Notifier (lien de vérification)
//   4. GET /api/verify/{token}
//   5. Token inconnu ou déjà utilisé -> TokenInvalid, expiré -> TokenExpired
//   6. Sinon used = true (update conditionnel) et users.verified = true
//      - PATIENT : compte actif immédiatement
//      - MEDECIN : reste inactif jusqu'à validation par un admin hôpital
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_verification_tokens")]
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

/// Un token déjà utilisé est invalide, un token périmé est expiré
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
