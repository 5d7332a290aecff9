pub mod acces;
pub mod account;
pub mod admin;
pub mod auth;
pub mod dossiers;
pub mod health;
pub mod navigation;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .service(navigation::resolve_path)
            .configure(auth::auth_routes)
            .configure(account::account_routes)
            .configure(dossiers::dossiers_routes)
            .configure(acces::acces_routes)
            .configure(admin::admin_routes),
    );
}
