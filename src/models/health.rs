use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String, // "ok" ou "unreachable"
    pub time: DateTime<Utc>,
}
