use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use healthsafe::config::AppConfig;
use healthsafe::services::identity_service::IdentityService;
use healthsafe::services::notifier::{LogNotifier, Notifier};
use healthsafe::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {}", e)))?;
    db::create_schema(&db)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to create schema: {}", e)))?;
    info!("Database connected");

    IdentityService::seed_super_admin(&db, &config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to seed super admin: {}", e)))?;

    let bind = (config.host.clone(), config.port);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);
    let notifier_data: web::Data<dyn Notifier> = web::Data::from(notifier);

    info!("Starting server on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(notifier_data.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
