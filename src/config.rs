// configuration lue depuis l'environnement (.env chargé par dotenv dans main)

use std::env;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub session_ttl_hours: i64,
    pub verification_token_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub password_iterations: u32,
    pub frontend_url: String,
    pub super_admin: Option<SuperAdminSeed>,
}

/// Compte SUPER_ADMIN créé au démarrage s'il n'existe pas
#[derive(Debug, Clone)]
pub struct SuperAdminSeed {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let super_admin = match (env::var("SUPER_ADMIN_EMAIL"), env::var("SUPER_ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(SuperAdminSeed { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 24)?,
            verification_token_ttl_hours: parse_var("VERIFICATION_TOKEN_TTL_HOURS", 24)?,
            reset_token_ttl_minutes: parse_var("RESET_TOKEN_TTL_MINUTES", 60)?,
            password_iterations: parse_var("PASSWORD_ITERATIONS", 260_000)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            super_admin,
        })
    }

    /// Configuration utilisée par les tests (hash rapide, pas de seed)
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            session_ttl_hours: 24,
            verification_token_ttl_hours: 24,
            reset_token_ttl_minutes: 60,
            password_iterations: 1_000,
            frontend_url: "http://localhost:5173".to_string(),
            super_admin: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
