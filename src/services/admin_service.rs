use chrono::Utc;
use log::{info, warn};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::dto::UserRef;
use crate::models::enums::{DoctorStatus, GrantStatus, PromotionStatus, RequestStatus, Role};
use crate::models::{
    access_grants, access_requests, admin_promotions, email_verification_tokens,
    password_reset_tokens, users,
};
use crate::services::identity_service::IdentityService;

pub struct AdminService;

/// Un ADMIN_HOPITAL et l'hôpital sur lequel portent ses droits
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalAdminSummary {
    pub user_id: i32,
    pub email: String,
    pub name: String,
    pub hospital: String,
    pub status: PromotionStatus,
    pub promoted_at: chrono::NaiveDateTime,
}

impl AdminService {
    /// Valide un médecin en attente. Réservé à un admin validé du même hôpital.
    pub async fn validate_doctor(
        db: &DatabaseConnection,
        hospital_admin_id: i32,
        doctor_ref: &UserRef,
    ) -> AppResult<users::Model> {
        let (_, hospital) = Self::hospital_scope(db, hospital_admin_id).await?;
        let doctor = Self::pending_doctor_in(db, doctor_ref, &hospital).await?;

        // VERIFIED_PENDING_VALIDATION -> VALIDATED, une seule fois
        let result = users::Entity::update_many()
            .col_expr(users::Column::DoctorStatus, Expr::value(DoctorStatus::Validated))
            .col_expr(users::Column::Active, Expr::value(true))
            .filter(users::Column::Id.eq(doctor.id))
            .filter(users::Column::DoctorStatus.eq(DoctorStatus::VerifiedPendingValidation))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Médecin"));
        }

        info!("Doctor {} validated by hospital admin {}", doctor.id, hospital_admin_id);
        Self::reload(db, doctor.id).await
    }

    pub async fn reject_doctor(
        db: &DatabaseConnection,
        hospital_admin_id: i32,
        doctor_ref: &UserRef,
    ) -> AppResult<users::Model> {
        let (_, hospital) = Self::hospital_scope(db, hospital_admin_id).await?;
        let doctor = Self::pending_doctor_in(db, doctor_ref, &hospital).await?;

        let result = users::Entity::update_many()
            .col_expr(users::Column::DoctorStatus, Expr::value(DoctorStatus::Rejected))
            .col_expr(users::Column::Active, Expr::value(false))
            .filter(users::Column::Id.eq(doctor.id))
            .filter(users::Column::DoctorStatus.eq(DoctorStatus::VerifiedPendingValidation))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Médecin"));
        }

        info!("Doctor {} rejected by hospital admin {}", doctor.id, hospital_admin_id);
        Self::reload(db, doctor.id).await
    }

    /// Médecins vérifiés en attente de validation dans l'hôpital de l'admin
    pub async fn list_pending_doctors(
        db: &DatabaseConnection,
        hospital_admin_id: i32,
    ) -> AppResult<Vec<users::Model>> {
        let (_, hospital) = Self::hospital_scope(db, hospital_admin_id).await?;

        Ok(users::Entity::find()
            .filter(users::Column::Role.eq(Role::Medecin))
            .filter(users::Column::Hospital.eq(hospital))
            .filter(users::Column::DoctorStatus.eq(DoctorStatus::VerifiedPendingValidation))
            .order_by_asc(users::Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// Promeut un médecin ADMIN_HOPITAL pour `hospital`. La promotion reste
    /// PENDING jusqu'à validate_hospital_admin.
    pub async fn promote_doctor_to_admin(
        db: &DatabaseConnection,
        super_admin_id: i32,
        doctor_ref: &UserRef,
        hospital: &str,
    ) -> AppResult<admin_promotions::Model> {
        Self::require_super_admin(db, super_admin_id).await?;

        let txn = db.begin().await?;

        let doctor = IdentityService::find_by_ref(&txn, doctor_ref)
            .await?
            .ok_or(AppError::NotFound("Médecin"))?;
        match doctor.role {
            Role::Medecin if doctor.verified => {}
            Role::AdminHopital => return Err(AppError::AlreadyAdmin),
            _ => return Err(AppError::NotFound("Médecin")),
        }

        let existing = admin_promotions::Entity::find()
            .filter(admin_promotions::Column::DoctorId.eq(doctor.id))
            .filter(
                admin_promotions::Column::Status
                    .is_in([PromotionStatus::Pending, PromotionStatus::Validated]),
            )
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::AlreadyAdmin);
        }

        let promotion = admin_promotions::ActiveModel {
            doctor_id: Set(doctor.id),
            hospital: Set(hospital.trim().to_string()),
            status: Set(PromotionStatus::Pending),
            created_at: Set(Utc::now().naive_utc()),
            validated_at: Set(None),
            revoked_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // le rôle change sous condition: un autre appel concurrent perd ici
        let result = users::Entity::update_many()
            .col_expr(users::Column::Role, Expr::value(Role::AdminHopital))
            .filter(users::Column::Id.eq(doctor.id))
            .filter(users::Column::Role.eq(Role::Medecin))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::AlreadyAdmin);
        }
        IdentityService::bump_session_version(&txn, doctor.id).await?;

        txn.commit().await?;
        info!(
            "Doctor {} promoted hospital admin of {} by super admin {}",
            doctor.id, promotion.hospital, super_admin_id
        );
        Ok(promotion)
    }

    /// PENDING -> VALIDATED
    pub async fn validate_hospital_admin(
        db: &DatabaseConnection,
        super_admin_id: i32,
        admin_ref: &UserRef,
    ) -> AppResult<admin_promotions::Model> {
        Self::require_super_admin(db, super_admin_id).await?;

        let admin = IdentityService::find_by_ref(db, admin_ref)
            .await?
            .filter(|user| user.role == Role::AdminHopital)
            .ok_or(AppError::NotFound("Administrateur"))?;

        let promotion = admin_promotions::Entity::find()
            .filter(admin_promotions::Column::DoctorId.eq(admin.id))
            .filter(
                admin_promotions::Column::Status
                    .is_in([PromotionStatus::Pending, PromotionStatus::Validated]),
            )
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Promotion"))?;
        if promotion.status == PromotionStatus::Validated {
            return Err(AppError::AlreadyValidated);
        }

        let result = admin_promotions::Entity::update_many()
            .col_expr(admin_promotions::Column::Status, Expr::value(PromotionStatus::Validated))
            .col_expr(
                admin_promotions::Column::ValidatedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(admin_promotions::Column::Id.eq(promotion.id))
            .filter(admin_promotions::Column::Status.eq(PromotionStatus::Pending))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::AlreadyValidated);
        }

        info!("Hospital admin {} validated by super admin {}", admin.id, super_admin_id);
        admin_promotions::Entity::find_by_id(promotion.id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Promotion"))
    }

    /// Retire les droits ADMIN_HOPITAL (retour à MEDECIN).
    /// Sans `confirmed`, renvoie ConfirmationRequired avec le résumé de la
    /// cible et ne modifie rien.
    pub async fn revoke_admin(
        db: &DatabaseConnection,
        super_admin_id: i32,
        admin_email: &str,
        confirmed: bool,
    ) -> AppResult<users::Model> {
        Self::require_super_admin(db, super_admin_id).await?;

        let admin = IdentityService::find_by_ref(db, &UserRef::Email(admin_email.to_string()))
            .await?
            .filter(|user| user.role == Role::AdminHopital)
            .ok_or(AppError::NotFound("Administrateur"))?;

        if !confirmed {
            let hospital = Self::active_promotion(db, admin.id).await?.map(|p| p.hospital);
            return Err(AppError::ConfirmationRequired(json!({
                "email": admin.email,
                "name": admin.full_name(),
                "hospital": hospital,
            })));
        }

        let txn = db.begin().await?;

        admin_promotions::Entity::update_many()
            .col_expr(admin_promotions::Column::Status, Expr::value(PromotionStatus::Revoked))
            .col_expr(
                admin_promotions::Column::RevokedAt,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(admin_promotions::Column::DoctorId.eq(admin.id))
            .filter(
                admin_promotions::Column::Status
                    .is_in([PromotionStatus::Pending, PromotionStatus::Validated]),
            )
            .exec(&txn)
            .await?;

        let result = users::Entity::update_many()
            .col_expr(users::Column::Role, Expr::value(Role::Medecin))
            .filter(users::Column::Id.eq(admin.id))
            .filter(users::Column::Role.eq(Role::AdminHopital))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Administrateur"));
        }
        IdentityService::bump_session_version(&txn, admin.id).await?;

        txn.commit().await?;
        warn!("Hospital admin rights of user {} revoked by super admin {}", admin.id, super_admin_id);
        Self::reload(db, admin.id).await
    }

    /// Supprime un compte médecin de l'hôpital de l'admin.
    /// Ses autorisations sont révoquées et ses demandes en attente refusées
    /// avant la suppression; les dossiers qu'il a rédigés restent.
    pub async fn delete_doctor(
        db: &DatabaseConnection,
        hospital_admin_id: i32,
        doctor_ref: &UserRef,
    ) -> AppResult<()> {
        let (_, hospital) = Self::hospital_scope(db, hospital_admin_id).await?;

        let txn = db.begin().await?;

        let doctor = IdentityService::find_by_ref(&txn, doctor_ref)
            .await?
            .filter(|user| user.role == Role::Medecin)
            .ok_or(AppError::NotFound("Médecin"))?;
        if doctor.hospital.as_deref() != Some(hospital.as_str()) {
            return Err(AppError::Forbidden);
        }

        let now = Utc::now().naive_utc();
        access_grants::Entity::update_many()
            .col_expr(access_grants::Column::Status, Expr::value(GrantStatus::Revoked))
            .col_expr(access_grants::Column::RevokedAt, Expr::value(now))
            .filter(access_grants::Column::DoctorId.eq(doctor.id))
            .filter(access_grants::Column::Status.eq(GrantStatus::Active))
            .exec(&txn)
            .await?;
        access_requests::Entity::update_many()
            .col_expr(access_requests::Column::Status, Expr::value(RequestStatus::Refuse))
            .col_expr(access_requests::Column::RespondedAt, Expr::value(now))
            .filter(access_requests::Column::DoctorId.eq(doctor.id))
            .filter(access_requests::Column::Status.eq(RequestStatus::EnAttente))
            .exec(&txn)
            .await?;

        email_verification_tokens::Entity::delete_many()
            .filter(email_verification_tokens::Column::UserId.eq(doctor.id))
            .exec(&txn)
            .await?;
        password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::UserId.eq(doctor.id))
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(doctor.id).exec(&txn).await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Médecin"));
        }

        txn.commit().await?;
        warn!("Doctor {} deleted by hospital admin {}", doctor.id, hospital_admin_id);
        Ok(())
    }

    /// Réactive un compte désactivé. Un médecin non validé n'est jamais
    /// activé par ce biais.
    pub async fn reactivate_user(
        db: &DatabaseConnection,
        admin_id: i32,
        user_ref: &UserRef,
    ) -> AppResult<users::Model> {
        let target = Self::managed_user(db, admin_id, user_ref).await?;

        let reactivable = target.verified
            && !target.active
            && (target.role != Role::Medecin
                || target.doctor_status == Some(DoctorStatus::Validated));
        if !reactivable {
            return Err(AppError::NotFound("Compte désactivé"));
        }

        let result = users::Entity::update_many()
            .col_expr(users::Column::Active, Expr::value(true))
            .filter(users::Column::Id.eq(target.id))
            .filter(users::Column::Active.eq(false))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Compte désactivé"));
        }

        info!("User {} reactivated by admin {}", target.id, admin_id);
        Self::reload(db, target.id).await
    }

    pub async fn deactivate_user(
        db: &DatabaseConnection,
        admin_id: i32,
        user_ref: &UserRef,
    ) -> AppResult<users::Model> {
        let target = Self::managed_user(db, admin_id, user_ref).await?;

        let result = users::Entity::update_many()
            .col_expr(users::Column::Active, Expr::value(false))
            .filter(users::Column::Id.eq(target.id))
            .filter(users::Column::Active.eq(true))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("Compte actif"));
        }
        IdentityService::bump_session_version(db, target.id).await?;

        warn!("User {} deactivated by admin {}", target.id, admin_id);
        Self::reload(db, target.id).await
    }

    pub async fn list_hospital_admins(
        db: &DatabaseConnection,
        super_admin_id: i32,
    ) -> AppResult<Vec<HospitalAdminSummary>> {
        Self::require_super_admin(db, super_admin_id).await?;

        let promotions = admin_promotions::Entity::find()
            .filter(
                admin_promotions::Column::Status
                    .is_in([PromotionStatus::Pending, PromotionStatus::Validated]),
            )
            .order_by_asc(admin_promotions::Column::Hospital)
            .all(db)
            .await?;

        let mut summaries = Vec::new();
        for promotion in promotions {
            if let Some(user) = users::Entity::find_by_id(promotion.doctor_id).one(db).await? {
                summaries.push(HospitalAdminSummary {
                    user_id: user.id,
                    email: user.email.clone(),
                    name: user.full_name(),
                    hospital: promotion.hospital,
                    status: promotion.status,
                    promoted_at: promotion.created_at,
                });
            }
        }

        Ok(summaries)
    }

    /// Admin hôpital actif avec une promotion VALIDATED, sinon Forbidden
    async fn hospital_scope(db: &DatabaseConnection, admin_id: i32) -> AppResult<(users::Model, String)> {
        let admin = IdentityService::require_role(db, admin_id, Role::AdminHopital).await?;
        if !admin.active {
            return Err(AppError::Forbidden);
        }

        let promotion = Self::active_promotion(db, admin.id)
            .await?
            .filter(|p| p.status == PromotionStatus::Validated)
            .ok_or(AppError::Forbidden)?;

        Ok((admin, promotion.hospital))
    }

    async fn require_super_admin(db: &DatabaseConnection, user_id: i32) -> AppResult<users::Model> {
        let admin = IdentityService::require_role(db, user_id, Role::SuperAdmin).await?;
        if !admin.active {
            return Err(AppError::Forbidden);
        }
        Ok(admin)
    }

    async fn active_promotion(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> AppResult<Option<admin_promotions::Model>> {
        Ok(admin_promotions::Entity::find()
            .filter(admin_promotions::Column::DoctorId.eq(user_id))
            .filter(
                admin_promotions::Column::Status
                    .is_in([PromotionStatus::Pending, PromotionStatus::Validated]),
            )
            .one(db)
            .await?)
    }

    /// Médecin de `hospital` en attente de validation
    async fn pending_doctor_in(
        db: &DatabaseConnection,
        doctor_ref: &UserRef,
        hospital: &str,
    ) -> AppResult<users::Model> {
        let doctor = IdentityService::find_by_ref(db, doctor_ref)
            .await?
            .filter(|user| user.role == Role::Medecin)
            .ok_or(AppError::NotFound("Médecin"))?;

        if doctor.hospital.as_deref() != Some(hospital) {
            return Err(AppError::Forbidden);
        }

        match doctor.doctor_status {
            Some(DoctorStatus::VerifiedPendingValidation) => Ok(doctor),
            Some(DoctorStatus::Validated) => Err(AppError::AlreadyValidated),
            _ => Err(AppError::NotFound("Médecin")),
        }
    }

    /// Compte que l'admin a le droit de (dés)activer:
    /// SUPER_ADMIN -> tout compte sauf SUPER_ADMIN,
    /// ADMIN_HOPITAL -> les médecins de son hôpital
    async fn managed_user(db: &DatabaseConnection, admin_id: i32, user_ref: &UserRef) -> AppResult<users::Model> {
        let admin = users::Entity::find_by_id(admin_id)
            .one(db)
            .await?
            .ok_or(AppError::Forbidden)?;

        let target = IdentityService::find_by_ref(db, user_ref)
            .await?
            .ok_or(AppError::NotFound("Utilisateur"))?;

        match admin.role {
            Role::SuperAdmin if admin.active && target.role != Role::SuperAdmin => Ok(target),
            Role::AdminHopital => {
                let (_, hospital) = Self::hospital_scope(db, admin_id).await?;
                if target.role == Role::Medecin && target.hospital.as_deref() == Some(hospital.as_str()) {
                    Ok(target)
                } else {
                    Err(AppError::Forbidden)
                }
            }
            _ => Err(AppError::Forbidden),
        }
    }

    async fn reload(db: &DatabaseConnection, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Utilisateur"))
    }
}
