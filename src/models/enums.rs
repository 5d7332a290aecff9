// Énumérations stockées en base (colonnes VARCHAR) et exposées en JSON
// avec la même valeur que côté front-end (PATIENT, EN_ATTENTE, ...)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "PATIENT")]
    Patient,
    #[sea_orm(string_value = "MEDECIN")]
    Medecin,
    #[sea_orm(string_value = "ADMIN_HOPITAL")]
    AdminHopital,
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
}

/// Cycle de vie d'un compte médecin:
/// UNVERIFIED -> VERIFIED_PENDING_VALIDATION -> VALIDATED | REJECTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoctorStatus {
    #[sea_orm(string_value = "UNVERIFIED")]
    Unverified,
    #[sea_orm(string_value = "VERIFIED_PENDING_VALIDATION")]
    VerifiedPendingValidation,
    #[sea_orm(string_value = "VALIDATED")]
    Validated,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[sea_orm(string_value = "EN_ATTENTE")]
    EnAttente,
    #[sea_orm(string_value = "ACCEPTE")]
    Accepte,
    #[sea_orm(string_value = "REFUSE")]
    Refuse,
}

/// Décision d'un patient sur une demande d'accès
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accepte,
    Refuse,
}

impl From<Decision> for RequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepte => RequestStatus::Accepte,
            Decision::Refuse => RequestStatus::Refuse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "REVOKED")]
    Revoked,
}

/// Chemin de création d'une autorisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantSource {
    #[sea_orm(string_value = "DEMANDE")]
    Demande,
    #[sea_orm(string_value = "DIRECT")]
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "VALIDATED")]
    Validated,
    #[sea_orm(string_value = "REVOKED")]
    Revoked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevisionKind {
    #[sea_orm(string_value = "CREATION")]
    Creation,
    #[sea_orm(string_value = "AMENDEMENT")]
    Amendement,
    #[sea_orm(string_value = "FICHIER")]
    Fichier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_json_matches_front_end() {
        assert_eq!(serde_json::to_string(&Role::AdminHopital).unwrap(), "\"ADMIN_HOPITAL\"");
        assert_eq!(serde_json::to_string(&Role::Medecin).unwrap(), "\"MEDECIN\"");
    }

    #[test]
    fn test_decision_parsing() {
        let decision: Decision = serde_json::from_str("\"REFUSE\"").unwrap();
        assert_eq!(RequestStatus::from(decision), RequestStatus::Refuse);
        assert!(serde_json::from_str::<Decision>("\"EN_ATTENTE\"").is_err());
    }

    #[test]
    fn test_status_db_values() {
        assert_eq!(RequestStatus::EnAttente.to_value(), "EN_ATTENTE");
        assert_eq!(DoctorStatus::VerifiedPendingValidation.to_value(), "VERIFIED_PENDING_VALIDATION");
    }
}
