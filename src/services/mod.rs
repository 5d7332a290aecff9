// Logique métier, indépendante d'actix-web : les routes valident les DTO,
// appellent un service et traduisent AppError en réponse HTTP.

pub mod access_service;
pub mod admin_service;
pub mod identity_service;
pub mod notifier;
pub mod record_guard;
pub mod record_service;

#[cfg(test)]
pub mod fixtures;
