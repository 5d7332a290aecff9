use chrono::{Duration, Utc};
use log::{info, warn};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{on_unique_violation, AppError, AppResult};
use crate::models::dto::{RegisterMedecinRequest, RegisterPatientRequest, UserRef};
use crate::models::enums::{DoctorStatus, Role};
use crate::models::{email_verification_tokens, password_reset_tokens, users};
use crate::services::notifier::Notifier;
use crate::utils::{codes, jwt, password};

const PATIENT_CODE_ATTEMPTS: usize = 5;

pub struct IdentityService;

/// Session ouverte par login
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: users::Model,
}

impl IdentityService {
    /// Inscrit un patient (non vérifié) et envoie le lien de vérification
    pub async fn register_patient(
        db: &DatabaseConnection,
        config: &AppConfig,
        notifier: &dyn Notifier,
        request: RegisterPatientRequest,
    ) -> AppResult<users::Model> {
        let email = normalize_email(&request.email);
        Self::ensure_email_free(db, &email).await?;

        let password_hash = password::hash_password(&request.password, config.password_iterations)
            .map_err(AppError::Internal)?;
        let patient_code = Self::unique_patient_code(db).await?;

        let user = users::ActiveModel {
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            role: Set(Role::Patient),
            verified: Set(false),
            active: Set(false),
            hospital: Set(None),
            license_number: Set(None),
            patient_code: Set(Some(patient_code)),
            doctor_status: Set(None),
            session_version: Set(0),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| on_unique_violation(e, "Email"))?;

        info!("Patient account {} registered", user.id);
        Self::issue_verification_token(db, config, notifier, &user).await?;
        Ok(user)
    }

    /// Inscrit un médecin: non vérifié, puis en attente de validation par
    /// un admin de son hôpital
    pub async fn register_medecin(
        db: &DatabaseConnection,
        config: &AppConfig,
        notifier: &dyn Notifier,
        request: RegisterMedecinRequest,
    ) -> AppResult<users::Model> {
        let email = normalize_email(&request.email);
        Self::ensure_email_free(db, &email).await?;

        let license_number = request.license_number.trim().to_string();
        let license_taken = users::Entity::find()
            .filter(users::Column::LicenseNumber.eq(&license_number))
            .one(db)
            .await?;
        if license_taken.is_some() {
            return Err(AppError::AlreadyExists("Numéro de licence"));
        }

        let password_hash = password::hash_password(&request.password, config.password_iterations)
            .map_err(AppError::Internal)?;

        let user = users::ActiveModel {
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            role: Set(Role::Medecin),
            verified: Set(false),
            active: Set(false),
            hospital: Set(Some(request.hospital.trim().to_string())),
            license_number: Set(Some(license_number)),
            patient_code: Set(None),
            doctor_status: Set(Some(DoctorStatus::Unverified)),
            session_version: Set(0),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| on_unique_violation(e, "Compte"))?;

        info!("Doctor account {} registered for hospital {:?}", user.id, user.hospital);
        Self::issue_verification_token(db, config, notifier, &user).await?;
        Ok(user)
    }

    /// Consomme un token de vérification (usage unique, 24h)
    pub async fn verify_email(db: &DatabaseConnection, token: &str) -> AppResult<users::Model> {
        let txn = db.begin().await?;

        let record = email_verification_tokens::Entity::find()
            .filter(email_verification_tokens::Column::Token.eq(token))
            .one(&txn)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        record.check_usable(Utc::now().naive_utc())?;

        // used = false -> true, une seule fois
        let consumed = email_verification_tokens::Entity::update_many()
            .col_expr(email_verification_tokens::Column::Used, Expr::value(true))
            .filter(email_verification_tokens::Column::Id.eq(record.id))
            .filter(email_verification_tokens::Column::Used.eq(false))
            .exec(&txn)
            .await?;
        if consumed.rows_affected != 1 {
            return Err(AppError::TokenInvalid);
        }

        let user = users::Entity::find_by_id(record.user_id)
            .one(&txn)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        let mut active_model: users::ActiveModel = user.clone().into();
        active_model.verified = Set(true);
        match user.role {
            Role::Patient => active_model.active = Set(true),
            Role::Medecin if user.doctor_status == Some(DoctorStatus::Unverified) => {
                active_model.doctor_status = Set(Some(DoctorStatus::VerifiedPendingValidation));
                active_model.active = Set(false);
            }
            _ => {}
        }
        let user = active_model.update(&txn).await?;

        txn.commit().await?;
        info!("Email verified for user {} ({:?})", user.id, user.role);
        Ok(user)
    }

    /// Renvoie un lien de vérification. Répond de la même façon que le compte
    /// existe ou non.
    pub async fn resend_verification(
        db: &DatabaseConnection,
        config: &AppConfig,
        notifier: &dyn Notifier,
        email: &str,
    ) -> AppResult<()> {
        let user = Self::find_by_email(db, &normalize_email(email)).await?;
        if let Some(user) = user.filter(|u| !u.verified) {
            Self::issue_verification_token(db, config, notifier, &user).await?;
        }
        Ok(())
    }

    pub async fn login(
        db: &DatabaseConnection,
        config: &AppConfig,
        email: &str,
        password_input: &str,
    ) -> AppResult<Session> {
        // 1. Trouver l'utilisateur
        let user = Self::find_by_email(db, &normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // 2. Vérifier le mot de passe
        let is_valid = password::verify_password(password_input, &user.password_hash)
            .map_err(AppError::Internal)?;
        if !is_valid {
            warn!("Failed login for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        // 3. Compte non vérifié = identifiants refusés
        if !user.verified {
            return Err(AppError::InvalidCredentials);
        }

        // 4. Générer le JWT
        let token = jwt::generate_token(
            &config.jwt_secret,
            config.session_ttl_hours,
            user.id,
            user.role,
            user.session_version,
        )
        .map_err(AppError::Internal)?;

        info!("User {} logged in as {:?}", user.id, user.role);
        Ok(Session { token, user })
    }

    /// Utilisateur courant d'une session. Une session dont la version ne
    /// correspond plus (logout, changement de rôle) est rejetée.
    pub async fn get_me<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
        session_version: i32,
    ) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .filter(|user| user.session_version == session_version)
            .ok_or(AppError::Unauthenticated)
    }

    /// Invalide toutes les sessions de l'utilisateur
    pub async fn logout(db: &DatabaseConnection, user_id: i32) -> AppResult<()> {
        Self::bump_session_version(db, user_id).await?;
        info!("User {} logged out", user_id);
        Ok(())
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        config: &AppConfig,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let is_valid = password::verify_password(current_password, &user.password_hash)
            .map_err(AppError::Internal)?;
        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = password::hash_password(new_password, config.password_iterations)
            .map_err(AppError::Internal)?;

        let mut active_model: users::ActiveModel = user.into();
        active_model.password_hash = Set(new_hash);
        active_model.update(db).await?;

        info!("Password changed for user {}", user_id);
        Ok(())
    }

    /// Émet un token de reset (1h) si le compte existe. Ne révèle jamais
    /// si l'email est connu.
    pub async fn forgot_password(
        db: &DatabaseConnection,
        config: &AppConfig,
        notifier: &dyn Notifier,
        email: &str,
    ) -> AppResult<()> {
        let Some(user) = Self::find_by_email(db, &normalize_email(email)).await? else {
            return Ok(());
        };

        let now = Utc::now().naive_utc();
        let token = Uuid::new_v4().to_string();

        password_reset_tokens::ActiveModel {
            user_id: Set(user.id),
            token: Set(token.clone()),
            expires_at: Set(now + Duration::minutes(config.reset_token_ttl_minutes)),
            used: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let link = format!("{}/password/reset/{}", config.frontend_url, token);
        notifier.send_password_reset(&user.email, &link).await;
        Ok(())
    }

    pub async fn reset_password(
        db: &DatabaseConnection,
        config: &AppConfig,
        token: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let txn = db.begin().await?;

        let record = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .one(&txn)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        record.check_usable(Utc::now().naive_utc())?;

        let consumed = password_reset_tokens::Entity::update_many()
            .col_expr(password_reset_tokens::Column::Used, Expr::value(true))
            .filter(password_reset_tokens::Column::Id.eq(record.id))
            .filter(password_reset_tokens::Column::Used.eq(false))
            .exec(&txn)
            .await?;
        if consumed.rows_affected != 1 {
            return Err(AppError::TokenInvalid);
        }

        let new_hash = password::hash_password(new_password, config.password_iterations)
            .map_err(AppError::Internal)?;

        users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(new_hash))
            .col_expr(
                users::Column::SessionVersion,
                Expr::col(users::Column::SessionVersion).add(1),
            )
            .filter(users::Column::Id.eq(record.user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!("Password reset for user {}", record.user_id);
        Ok(())
    }

    /// Code patient courant (réservé au patient lui-même)
    pub async fn get_patient_code(db: &DatabaseConnection, patient_id: i32) -> AppResult<String> {
        let patient = Self::require_role(db, patient_id, Role::Patient).await?;
        patient
            .patient_code
            .ok_or(AppError::Internal(format!("patient {} has no code", patient_id)))
    }

    /// Remplace le code patient: l'ancien ne résout plus rien
    pub async fn regenerate_patient_code(db: &DatabaseConnection, patient_id: i32) -> AppResult<String> {
        let patient = Self::require_role(db, patient_id, Role::Patient).await?;
        let code = Self::unique_patient_code(db).await?;

        let mut active_model: users::ActiveModel = patient.into();
        active_model.patient_code = Set(Some(code.clone()));
        active_model
            .update(db)
            .await
            .map_err(|e| on_unique_violation(e, "Code patient"))?;

        info!("Patient code regenerated for user {}", patient_id);
        Ok(code)
    }

    /// Résout un code patient vers un patient vérifié et actif.
    /// Seul moyen pour un médecin de désigner un patient.
    pub async fn resolve_patient_code<C: ConnectionTrait>(db: &C, code: &str) -> AppResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::PatientCode.eq(codes::normalize_patient_code(code)))
            .filter(users::Column::Role.eq(Role::Patient))
            .one(db)
            .await?
            .filter(|patient| patient.verified && patient.active)
            .ok_or(AppError::PatientNotFound)
    }

    pub async fn find_by_ref<C: ConnectionTrait>(db: &C, user_ref: &UserRef) -> AppResult<Option<users::Model>> {
        let user = match user_ref {
            UserRef::Id(id) => users::Entity::find_by_id(*id).one(db).await?,
            UserRef::Email(email) => Self::find_by_email(db, &normalize_email(email)).await?,
        };
        Ok(user)
    }

    pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?)
    }

    /// Charge l'utilisateur et vérifie son rôle (Forbidden sinon)
    pub async fn require_role<C: ConnectionTrait>(db: &C, user_id: i32, role: Role) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .filter(|user| user.role == role)
            .ok_or(AppError::Forbidden)
    }

    pub async fn bump_session_version<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<()> {
        users::Entity::update_many()
            .col_expr(
                users::Column::SessionVersion,
                Expr::col(users::Column::SessionVersion).add(1),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Crée le compte SUPER_ADMIN de la configuration s'il n'existe pas
    pub async fn seed_super_admin(db: &DatabaseConnection, config: &AppConfig) -> AppResult<()> {
        let Some(seed) = &config.super_admin else {
            return Ok(());
        };

        let email = normalize_email(&seed.email);
        if Self::find_by_email(db, &email).await?.is_some() {
            return Ok(());
        }

        let password_hash = password::hash_password(&seed.password, config.password_iterations)
            .map_err(AppError::Internal)?;

        let admin = users::ActiveModel {
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set("Super".to_string()),
            last_name: Set("Admin".to_string()),
            role: Set(Role::SuperAdmin),
            verified: Set(true),
            active: Set(true),
            session_version: Set(0),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Super admin account {} created", admin.id);
        Ok(())
    }

    async fn ensure_email_free(db: &DatabaseConnection, email: &str) -> AppResult<()> {
        if Self::find_by_email(db, email).await?.is_some() {
            return Err(AppError::AlreadyExists("Email"));
        }
        Ok(())
    }

    async fn unique_patient_code(db: &DatabaseConnection) -> AppResult<String> {
        for _ in 0..PATIENT_CODE_ATTEMPTS {
            let code = codes::generate_patient_code();
            let taken = users::Entity::find()
                .filter(users::Column::PatientCode.eq(&code))
                .one(db)
                .await?;
            if taken.is_none() {
                return Ok(code);
            }
        }
        Err(AppError::Internal("could not allocate a unique patient code".to_string()))
    }

    async fn issue_verification_token(
        db: &DatabaseConnection,
        config: &AppConfig,
        notifier: &dyn Notifier,
        user: &users::Model,
    ) -> AppResult<()> {
        let now = Utc::now().naive_utc();
        let token = Uuid::new_v4().to_string();

        email_verification_tokens::ActiveModel {
            user_id: Set(user.id),
            token: Set(token.clone()),
            expires_at: Set(now + Duration::hours(config.verification_token_ttl_hours)),
            used: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let link = format!("{}/verify/{}", config.frontend_url, token);
        notifier.send_verification(&user.email, &link).await;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db;
    use crate::services::notifier::testing::RecordingNotifier;

    pub fn patient_request(email: &str) -> RegisterPatientRequest {
        RegisterPatientRequest {
            email: email.to_string(),
            password: "motdepasse".to_string(),
            first_name: "Jeanne".to_string(),
            last_name: "Martin".to_string(),
        }
    }

    pub fn medecin_request(email: &str, hospital: &str, license: &str) -> RegisterMedecinRequest {
        RegisterMedecinRequest {
            email: email.to_string(),
            password: "motdepasse".to_string(),
            first_name: "Paul".to_string(),
            last_name: "Durand".to_string(),
            hospital: hospital.to_string(),
            license_number: license.to_string(),
        }
    }

    #[actix_web::test]
    async fn test_patient_usable_after_verification() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        let patient = IdentityService::register_patient(&db, &config, &notifier, patient_request("jeanne@mail.fr"))
            .await
            .unwrap();
        assert!(!patient.verified);
        assert!(patient.patient_code.is_some());

        // login refusé tant que l'email n'est pas vérifié
        let err = IdentityService::login(&db, &config, "jeanne@mail.fr", "motdepasse").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let token = notifier.last_token_for("jeanne@mail.fr").unwrap();
        let verified = IdentityService::verify_email(&db, &token).await.unwrap();
        assert!(verified.verified && verified.active);

        let session = IdentityService::login(&db, &config, "Jeanne@Mail.fr", "motdepasse").await.unwrap();
        assert_eq!(session.user.id, patient.id);
    }

    #[actix_web::test]
    async fn test_doctor_pending_validation_after_verification() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        IdentityService::register_medecin(&db, &config, &notifier, medecin_request("dr@chu.fr", "CHU Lyon", "LIC-0001"))
            .await
            .unwrap();
        let token = notifier.last_token_for("dr@chu.fr").unwrap();
        let doctor = IdentityService::verify_email(&db, &token).await.unwrap();

        assert!(doctor.verified);
        assert!(!doctor.active);
        assert_eq!(doctor.doctor_status, Some(DoctorStatus::VerifiedPendingValidation));
        assert!(!doctor.is_practicing_doctor());
    }

    #[actix_web::test]
    async fn test_verification_token_single_use() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        IdentityService::register_patient(&db, &config, &notifier, patient_request("a@mail.fr")).await.unwrap();
        let token = notifier.last_token_for("a@mail.fr").unwrap();

        IdentityService::verify_email(&db, &token).await.unwrap();
        let err = IdentityService::verify_email(&db, &token).await.unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));

        let err = IdentityService::verify_email(&db, "inconnu").await.unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[actix_web::test]
    async fn test_expired_verification_token() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        let user = IdentityService::register_patient(&db, &config, &notifier, patient_request("b@mail.fr")).await.unwrap();

        let past = Utc::now().naive_utc() - Duration::hours(25);
        email_verification_tokens::ActiveModel {
            user_id: Set(user.id),
            token: Set("expire".to_string()),
            expires_at: Set(past + Duration::hours(24)),
            used: Set(false),
            created_at: Set(past),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let err = IdentityService::verify_email(&db, "expire").await.unwrap_err();
        assert!(matches!(err, AppError::TokenExpired));
    }

    #[actix_web::test]
    async fn test_duplicate_email_and_license() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        IdentityService::register_medecin(&db, &config, &notifier, medecin_request("dr@chu.fr", "CHU", "LIC-1"))
            .await
            .unwrap();

        let err = IdentityService::register_patient(&db, &config, &notifier, patient_request("DR@chu.fr"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists("Email")));

        let err = IdentityService::register_medecin(&db, &config, &notifier, medecin_request("autre@chu.fr", "CHU", "LIC-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[actix_web::test]
    async fn test_logout_invalidates_session() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        IdentityService::register_patient(&db, &config, &notifier, patient_request("c@mail.fr")).await.unwrap();
        let token = notifier.last_token_for("c@mail.fr").unwrap();
        IdentityService::verify_email(&db, &token).await.unwrap();

        let session = IdentityService::login(&db, &config, "c@mail.fr", "motdepasse").await.unwrap();
        let me = IdentityService::get_me(&db, session.user.id, session.user.session_version).await.unwrap();
        assert_eq!(me.email, "c@mail.fr");

        IdentityService::logout(&db, me.id).await.unwrap();
        let err = IdentityService::get_me(&db, me.id, session.user.session_version).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[actix_web::test]
    async fn test_password_reset_flow() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        IdentityService::register_patient(&db, &config, &notifier, patient_request("d@mail.fr")).await.unwrap();
        let token = notifier.last_token_for("d@mail.fr").unwrap();
        IdentityService::verify_email(&db, &token).await.unwrap();

        // email inconnu: pas d'erreur, pas d'envoi
        IdentityService::forgot_password(&db, &config, &notifier, "inconnu@mail.fr").await.unwrap();
        assert!(notifier.last_token_for("inconnu@mail.fr").is_none());

        IdentityService::forgot_password(&db, &config, &notifier, "d@mail.fr").await.unwrap();
        let reset = notifier.last_token_for("d@mail.fr").unwrap();
        IdentityService::reset_password(&db, &config, &reset, "nouveau-mdp").await.unwrap();

        assert!(IdentityService::login(&db, &config, "d@mail.fr", "motdepasse").await.is_err());
        assert!(IdentityService::login(&db, &config, "d@mail.fr", "nouveau-mdp").await.is_ok());

        let err = IdentityService::reset_password(&db, &config, &reset, "encore-autre").await.unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[actix_web::test]
    async fn test_regenerated_code_replaces_old_one() {
        let db = db::connect_in_memory().await.unwrap();
        let config = AppConfig::for_tests();
        let notifier = RecordingNotifier::default();

        let patient = IdentityService::register_patient(&db, &config, &notifier, patient_request("e@mail.fr")).await.unwrap();
        let token = notifier.last_token_for("e@mail.fr").unwrap();
        IdentityService::verify_email(&db, &token).await.unwrap();

        let old_code = IdentityService::get_patient_code(&db, patient.id).await.unwrap();
        assert_eq!(IdentityService::resolve_patient_code(&db, &old_code).await.unwrap().id, patient.id);

        let new_code = IdentityService::regenerate_patient_code(&db, patient.id).await.unwrap();
        assert_ne!(old_code, new_code);

        let err = IdentityService::resolve_patient_code(&db, &old_code).await.unwrap_err();
        assert!(matches!(err, AppError::PatientNotFound));
        assert!(IdentityService::resolve_patient_code(&db, &new_code.to_lowercase()).await.is_ok());
    }

    #[actix_web::test]
    async fn test_seed_super_admin_once() {
        let db = db::connect_in_memory().await.unwrap();
        let mut config = AppConfig::for_tests();
        config.super_admin = Some(crate::config::SuperAdminSeed {
            email: "root@healthsafe.fr".to_string(),
            password: "racine-secrete".to_string(),
        });

        IdentityService::seed_super_admin(&db, &config).await.unwrap();
        IdentityService::seed_super_admin(&db, &config).await.unwrap();

        let session = IdentityService::login(&db, &config, "root@healthsafe.fr", "racine-secrete").await.unwrap();
        assert_eq!(session.user.role, Role::SuperAdmin);
    }
}
