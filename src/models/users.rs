use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::{DoctorStatus, Role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Format: pbkdf2:sha256:iterations$salt$hash
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub verified: bool,
    pub active: bool,
    pub hospital: Option<String>, // MEDECIN / ADMIN_HOPITAL uniquement
    #[sea_orm(unique)]
    pub license_number: Option<String>, // MEDECIN uniquement
    #[sea_orm(unique)]
    #[serde(skip_serializing)] // Identifiant secret, jamais exposé hors de /patients/code
    pub patient_code: Option<String>,
    pub doctor_status: Option<DoctorStatus>,
    #[serde(skip_serializing)]
    pub session_version: i32, // incrémenté au logout / changement de rôle
    pub created_at: DateTime,
}

impl Model {
    /// Médecin vérifié, validé par son hôpital et actif
    pub fn is_practicing_doctor(&self) -> bool {
        self.role == Role::Medecin
            && self.verified
            && self.active
            && self.doctor_status == Some(DoctorStatus::Validated)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::email_verification_tokens::Entity")]
    EmailVerificationTokens,

    #[sea_orm(has_many = "super::password_reset_tokens::Entity")]
    PasswordResetTokens,

    #[sea_orm(has_many = "super::medical_records::Entity")]
    MedicalRecords,
}

impl Related<super::email_verification_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailVerificationTokens.def()
    }
}

impl Related<super::password_reset_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordResetTokens.def()
    }
}

impl Related<super::medical_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MedicalRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
