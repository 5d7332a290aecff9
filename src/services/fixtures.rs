// Comptes prêts à l'emploi pour les tests de services (insertion directe,
// sans passer par l'inscription et la vérification email)

use chrono::Utc;
use sea_orm::*;

use crate::models::admin_promotions;
use crate::models::enums::{DoctorStatus, PromotionStatus, Role};
use crate::models::users;

fn base_user(email: &str, role: Role) -> users::ActiveModel {
    users::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set("pbkdf2:sha256:1000$c2VsZA$aGFzaA".to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set(email.split('@').next().unwrap_or("user").to_string()),
        role: Set(role),
        verified: Set(true),
        active: Set(true),
        hospital: Set(None),
        license_number: Set(None),
        patient_code: Set(None),
        doctor_status: Set(None),
        session_version: Set(0),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
}

pub async fn patient(db: &DatabaseConnection, email: &str, code: &str) -> users::Model {
    let mut user = base_user(email, Role::Patient);
    user.patient_code = Set(Some(code.to_string()));
    user.insert(db).await.unwrap()
}

pub async fn doctor(db: &DatabaseConnection, email: &str, hospital: &str) -> users::Model {
    let mut user = base_user(email, Role::Medecin);
    user.hospital = Set(Some(hospital.to_string()));
    user.license_number = Set(Some(format!("LIC-{}", email)));
    user.doctor_status = Set(Some(DoctorStatus::Validated));
    user.insert(db).await.unwrap()
}

pub async fn pending_doctor(db: &DatabaseConnection, email: &str, hospital: &str) -> users::Model {
    let mut user = base_user(email, Role::Medecin);
    user.hospital = Set(Some(hospital.to_string()));
    user.license_number = Set(Some(format!("LIC-{}", email)));
    user.doctor_status = Set(Some(DoctorStatus::VerifiedPendingValidation));
    user.active = Set(false);
    user.insert(db).await.unwrap()
}

pub async fn super_admin(db: &DatabaseConnection, email: &str) -> users::Model {
    base_user(email, Role::SuperAdmin).insert(db).await.unwrap()
}

/// Ancien médecin promu ADMIN_HOPITAL, promotion déjà validée
pub async fn hospital_admin(db: &DatabaseConnection, email: &str, hospital: &str) -> users::Model {
    let mut user = base_user(email, Role::AdminHopital);
    user.hospital = Set(Some(hospital.to_string()));
    user.license_number = Set(Some(format!("LIC-{}", email)));
    user.doctor_status = Set(Some(DoctorStatus::Validated));
    let admin = user.insert(db).await.unwrap();

    let now = Utc::now().naive_utc();
    admin_promotions::ActiveModel {
        doctor_id: Set(admin.id),
        hospital: Set(hospital.to_string()),
        status: Set(PromotionStatus::Validated),
        created_at: Set(now),
        validated_at: Set(Some(now)),
        revoked_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    admin
}

pub async fn reload(db: &DatabaseConnection, user_id: i32) -> users::Model {
    users::Entity::find_by_id(user_id).one(db).await.unwrap().unwrap()
}
