// ============================================================================
// NAVIGATION : politique de redirection des tableaux de bord
// ============================================================================
//
// Description:
//   Table des routes front-end par rôle et décision Render / Redirect pour
//   un chemin donné. Ce n'est qu'une défense en profondeur : chaque appel
//   API refait ses contrôles côté serveur.
//
// Règles:
//   - pas de session sur une page protégée -> /login?next=<chemin>
//   - tableau de bord d'un autre rôle -> tableau de bord du rôle courant
//   - /login ou /register avec une session -> tableau de bord du rôle
//
// ============================================================================

use serde::Serialize;

use crate::error::AppError;
use crate::models::enums::Role;

pub const LOGIN_PATH: &str = "/login";

const PUBLIC_PATHS: [&str; 4] = ["/", "/login", "/register/patient", "/register/medecin"];
const PUBLIC_PREFIXES: [&str; 2] = ["/verify/", "/password/"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Resolution {
    Render { path: String },
    Redirect { target: String },
}

impl Resolution {
    fn redirect(target: impl Into<String>) -> Self {
        Resolution::Redirect { target: target.into() }
    }
}

pub fn dashboard_for(role: Role) -> &'static str {
    match role {
        Role::Patient => "/dashboard/patient",
        Role::Medecin => "/dashboard/medecin",
        Role::AdminHopital => "/dashboard/admin-hopital",
        Role::SuperAdmin => "/dashboard/super-admin",
    }
}

/// Rôle exigé par un chemin de tableau de bord (et ses sous-pages)
pub fn required_role(path: &str) -> Option<Role> {
    let section = path.strip_prefix("/dashboard/")?.split('/').next()?;
    match section {
        "patient" => Some(Role::Patient),
        "medecin" => Some(Role::Medecin),
        "admin-hopital" => Some(Role::AdminHopital),
        "super-admin" => Some(Role::SuperAdmin),
        _ => None,
    }
}

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Décide si `path` s'affiche pour une session de rôle `role` (None = pas
/// de session)
pub fn resolve(role: Option<Role>, path: &str) -> Resolution {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if is_public(path) {
        return match role {
            Some(role) if path == LOGIN_PATH || path.starts_with("/register/") => {
                Resolution::redirect(dashboard_for(role))
            }
            _ => Resolution::Render { path: path.to_string() },
        };
    }

    let Some(role) = role else {
        return Resolution::redirect(format!("{}?next={}", LOGIN_PATH, path));
    };

    match required_role(path) {
        Some(required) if required == role => Resolution::Render { path: path.to_string() },
        _ => Resolution::redirect(dashboard_for(role)),
    }
}

/// Redirection imposée par un code d'erreur API, None si l'erreur
/// s'affiche sur la page
pub fn redirect_for_error_code(code: &str, role: Option<Role>) -> Option<String> {
    match (code, role) {
        ("UNAUTHENTICATED", _) | ("FORBIDDEN", None) => Some(LOGIN_PATH.to_string()),
        ("FORBIDDEN", Some(role)) => Some(dashboard_for(role).to_string()),
        _ => None,
    }
}

pub fn redirect_for_error(error: &AppError, role: Option<Role>) -> Option<String> {
    redirect_for_error_code(error.code(), role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_dashboard_renders() {
        assert_eq!(
            resolve(Some(Role::Medecin), "/dashboard/medecin/dossiers"),
            Resolution::Render { path: "/dashboard/medecin/dossiers".into() }
        );
    }

    #[test]
    fn test_foreign_dashboard_redirects_home() {
        assert_eq!(
            resolve(Some(Role::Patient), "/dashboard/super-admin"),
            Resolution::Redirect { target: "/dashboard/patient".into() }
        );
        assert_eq!(
            resolve(Some(Role::AdminHopital), "/dashboard/inconnu"),
            Resolution::Redirect { target: "/dashboard/admin-hopital".into() }
        );
    }

    #[test]
    fn test_anonymous_sent_to_login() {
        assert_eq!(
            resolve(None, "/dashboard/patient/"),
            Resolution::Redirect { target: "/login?next=/dashboard/patient".into() }
        );
        assert_eq!(
            resolve(None, "/verify/abc"),
            Resolution::Render { path: "/verify/abc".into() }
        );
    }

    #[test]
    fn test_login_with_session_redirects() {
        assert_eq!(
            resolve(Some(Role::SuperAdmin), "/login"),
            Resolution::Redirect { target: "/dashboard/super-admin".into() }
        );
        assert_eq!(resolve(Some(Role::Patient), "/"), Resolution::Render { path: "/".into() });
    }

    #[test]
    fn test_error_redirects() {
        assert_eq!(redirect_for_error(&AppError::Unauthenticated, Some(Role::Patient)).as_deref(), Some("/login"));
        assert_eq!(
            redirect_for_error(&AppError::Forbidden, Some(Role::Medecin)).as_deref(),
            Some("/dashboard/medecin")
        );
        assert_eq!(redirect_for_error(&AppError::NotFound("Dossier"), Some(Role::Medecin)), None);
        assert_eq!(redirect_for_error(&AppError::TokenExpired, None), None);
    }

    #[test]
    fn test_resolution_json() {
        let json = serde_json::to_value(Resolution::redirect("/login")).unwrap();
        assert_eq!(json, serde_json::json!({"action": "redirect", "target": "/login"}));
    }
}
