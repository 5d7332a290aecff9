// connexion BD + création du schéma

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};

use crate::models::{
    access_grants, access_requests, admin_promotions, email_verification_tokens, medical_records,
    password_reset_tokens, record_files, record_revisions, users,
};

// Au plus une autorisation ACTIVE par (médecin, patient, dossier) ;
// record_id NULL (tous les dossiers) est normalisé à 0 pour l'unicité
const ACTIVE_GRANT_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS uq_access_grants_active \
     ON access_grants (doctor_id, patient_id, COALESCE(record_id, 0)) \
     WHERE status = 'ACTIVE'";

const PENDING_REQUEST_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS uq_access_requests_pending \
     ON access_requests (doctor_id, patient_id) \
     WHERE status = 'EN_ATTENTE'";

// Une seule révision par (dossier, version)
const REVISION_VERSION_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS uq_record_revisions_version \
     ON record_revisions (record_id, version)";

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// Base SQLite en mémoire (tests).
/// Une seule connexion: chaque connexion SQLite :memory: a sa propre base.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    create_schema(&db).await?;
    Ok(db)
}

/// Crée les tables manquantes et les index partiels.
/// L'ordre suit les clés étrangères.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, email_verification_tokens::Entity).await?;
    create_table(db, password_reset_tokens::Entity).await?;
    create_table(db, medical_records::Entity).await?;
    create_table(db, record_revisions::Entity).await?;
    create_table(db, record_files::Entity).await?;
    create_table(db, access_requests::Entity).await?;
    create_table(db, access_grants::Entity).await?;
    create_table(db, admin_promotions::Entity).await?;

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, ACTIVE_GRANT_INDEX)).await?;
    db.execute(Statement::from_string(backend, PENDING_REQUEST_INDEX)).await?;
    db.execute(Statement::from_string(backend, REVISION_VERSION_INDEX)).await?;

    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_schema_is_idempotent() {
        let db = connect_in_memory().await.unwrap();
        // deuxième passage: IF NOT EXISTS partout
        create_schema(&db).await.unwrap();
        assert!(users::Entity::find().all(&db).await.unwrap().is_empty());
    }
}
