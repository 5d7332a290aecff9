// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM (PostgreSQL en
//   production, SQLite en mémoire pour les tests).
//
// Liste des modules:
//   - enums : rôles et statuts stockés en base
//   - users : comptes PATIENT / MEDECIN / ADMIN_HOPITAL / SUPER_ADMIN
//   - email_verification_tokens : tokens de vérification email (expire 24h)
//   - password_reset_tokens : tokens de reset password (expire 1h)
//   - medical_records : dossiers médicaux ("DOS-NNN")
//   - record_revisions : historique des dossiers (ajout seul)
//   - record_files : fichiers joints (métadonnées)
//   - access_requests : demandes d'accès médecin -> patient ("DEM-NN")
//   - access_grants : registre des autorisations ACTIVE / REVOKED
//   - admin_promotions : promotions ADMIN_HOPITAL
//   - dto : Data Transfer Objects des requêtes/réponses API
//   - health : Health check API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut, sauf les index
//     partiels de db::create_schema)
//   - Les statuts ne sont modifiés que par des UPDATE conditionnels
//
// ============================================================================

pub mod enums;
pub mod users;
pub mod email_verification_tokens;
pub mod password_reset_tokens;
pub mod medical_records;
pub mod record_revisions;
pub mod record_files;
pub mod access_requests;
pub mod access_grants;
pub mod admin_promotions;
pub mod dto;
pub mod health;
