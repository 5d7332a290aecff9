use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::navigation;

#[derive(Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

/// GET /navigation?path=/dashboard/... - Render ou Redirect pour la session
/// courante (session absente ou expirée = anonyme)
#[get("/navigation")]
pub async fn resolve_path(
    auth_user: Option<AuthUser>,
    query: web::Query<NavigationQuery>,
) -> HttpResponse {
    let role = auth_user.map(|user| user.role);
    HttpResponse::Ok().json(navigation::resolve(role, &query.path))
}
