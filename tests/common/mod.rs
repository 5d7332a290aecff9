#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use sea_orm::*;

use healthsafe::config::AppConfig;
use healthsafe::models::enums::{DoctorStatus, PromotionStatus, Role};
use healthsafe::models::{admin_promotions, email_verification_tokens, users};
use healthsafe::services::notifier::{LogNotifier, Notifier};
use healthsafe::utils::password;

pub const PASSWORD: &str = "motdepasse";

pub fn notifier() -> web::Data<dyn Notifier> {
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    web::Data::from(notifier)
}

/// Dernier token de vérification émis pour ce compte
pub async fn verification_token(db: &DatabaseConnection, user_id: i32) -> String {
    email_verification_tokens::Entity::find()
        .filter(email_verification_tokens::Column::UserId.eq(user_id))
        .order_by_desc(email_verification_tokens::Column::Id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .token
}

async fn insert_user(
    db: &DatabaseConnection,
    config: &AppConfig,
    email: &str,
    role: Role,
    hospital: Option<&str>,
    doctor_status: Option<DoctorStatus>,
    patient_code: Option<&str>,
) -> users::Model {
    users::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password::hash_password(PASSWORD, config.password_iterations).unwrap()),
        first_name: Set("Test".to_string()),
        last_name: Set(email.to_string()),
        role: Set(role),
        verified: Set(true),
        active: Set(true),
        hospital: Set(hospital.map(str::to_string)),
        license_number: Set(doctor_status.map(|_| format!("LIC-{}", email))),
        patient_code: Set(patient_code.map(str::to_string)),
        doctor_status: Set(doctor_status),
        session_version: Set(0),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn patient(db: &DatabaseConnection, config: &AppConfig, email: &str, code: &str) -> users::Model {
    insert_user(db, config, email, Role::Patient, None, None, Some(code)).await
}

pub async fn doctor(db: &DatabaseConnection, config: &AppConfig, email: &str, hospital: &str) -> users::Model {
    insert_user(db, config, email, Role::Medecin, Some(hospital), Some(DoctorStatus::Validated), None).await
}

pub async fn super_admin(db: &DatabaseConnection, config: &AppConfig, email: &str) -> users::Model {
    insert_user(db, config, email, Role::SuperAdmin, None, None, None).await
}

pub async fn hospital_admin(db: &DatabaseConnection, config: &AppConfig, email: &str, hospital: &str) -> users::Model {
    let admin = insert_user(
        db,
        config,
        email,
        Role::AdminHopital,
        Some(hospital),
        Some(DoctorStatus::Validated),
        None,
    )
    .await;

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
