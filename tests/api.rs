// Tests HTTP de bout en bout sur l'API /api (SQLite en mémoire)

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use healthsafe::config::AppConfig;
use healthsafe::db;
use healthsafe::routes;

macro_rules! init_app {
    ($db:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new($config.clone()))
                .app_data(common::notifier())
                .configure(routes::configure_routes),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": $email, "password": common::PASSWORD }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_health_check() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    let app = init_app!(db, config);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[actix_web::test]
async fn test_patient_signup_verify_login_logout() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    let app = init_app!(db, config);

    let req = test::TestRequest::post()
        .uri("/api/patients/register")
        .set_json(json!({
            "email": "jeanne@mail.fr",
            "password": common::PASSWORD,
            "firstName": "Jeanne",
            "lastName": "Martin"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let user_id = created["id"].as_i64().unwrap() as i32;

    // non vérifié: identifiants refusés
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "jeanne@mail.fr", "password": common::PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let token = common::verification_token(&db, user_id).await;
    let req = test::TestRequest::get().uri(&format!("/api/verify/{}", token)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["role"], "PATIENT");

    // un token de vérification ne sert qu'une fois
    let req = test::TestRequest::get().uri(&format!("/api/verify/{}", token)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let session = login!(app, "jeanne@mail.fr");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["userId"], user_id);
    assert_eq!(me["role"], "PATIENT");

    let req = test::TestRequest::get()
        .uri("/api/patients/code")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .to_request();
    let code: Value = test::call_and_read_body_json(&app, req).await;
    assert!(code["codePatient"].as_str().unwrap().starts_with("PAT-"));

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // l'ancien token n'ouvre plus de session
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_validation_errors_are_field_level() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    let app = init_app!(db, config);

    let req = test::TestRequest::post()
        .uri("/api/medecins/register")
        .set_json(json!({
            "email": "pas-un-email",
            "password": "court",
            "firstName": "Paul",
            "lastName": "Durand",
            "hospital": "CHU Lyon",
            "licenseNumber": "LIC-0001"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());
}

#[actix_web::test]
async fn test_unknown_verification_token() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    let app = init_app!(db, config);

    let req = test::TestRequest::get().uri("/api/verify/inconnu").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_INVALID");
}

#[actix_web::test]
async fn test_protected_routes_require_session() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    let app = init_app!(db, config);

    for uri in ["/api/acces", "/api/dossiers", "/api/auth/me", "/api/admin/super/admins"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let req = test::TestRequest::get()
        .uri("/api/acces")
        .insert_header(("Authorization", "Bearer pas-un-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_session_cookie_is_accepted() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    common::patient(&db, &config, "p@mail.fr", "PAT-AAAA1111").await;
    let app = init_app!(db, config);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "p@mail.fr", "password": common::PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "healthsafe_session")
        .unwrap()
        .into_owned();
    assert!(cookie.http_only().unwrap_or(false));

    let req = test::TestRequest::get().uri("/api/auth/me").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_role_checks_on_admin_routes() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    common::patient(&db, &config, "p@mail.fr", "PAT-AAAA1111").await;
    let doctor = common::doctor(&db, &config, "dr@chu.fr", "CHU Lyon").await;
    let app = init_app!(db, config);
    let session = login!(app, "p@mail.fr");

    let req = test::TestRequest::post()
        .uri("/api/admin/super/promote")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .set_json(json!({ "doctorRef": doctor.id, "hospital": "CHU Lyon" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[actix_web::test]
async fn test_revoke_admin_two_steps() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    common::super_admin(&db, &config, "root@healthsafe.fr").await;
    common::hospital_admin(&db, &config, "x@hopital.fr", "CHU Lyon").await;
    let app = init_app!(db, config);
    let session = login!(app, "root@healthsafe.fr");

    let req = test::TestRequest::post()
        .uri("/api/admin/super/revoke")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .set_json(json!({ "email": "x@hopital.fr" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["target"]["hospital"], "CHU Lyon");

    let req = test::TestRequest::post()
        .uri("/api/admin/super/revoke")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .set_json(json!({ "email": "x@hopital.fr", "confirm": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["role"], "MEDECIN");
}

#[actix_web::test]
async fn test_access_request_over_http() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    common::patient(&db, &config, "p@mail.fr", "PAT-AAAA1111").await;
    common::doctor(&db, &config, "dr@chu.fr", "CHU Lyon").await;
    let app = init_app!(db, config);
    let doctor_session = login!(app, "dr@chu.fr");
    let patient_session = login!(app, "p@mail.fr");

    let req = test::TestRequest::post()
        .uri("/api/acces/demander")
        .insert_header(("Authorization", format!("Bearer {}", doctor_session)))
        .set_json(json!({ "codePatient": "PAT-AAAA1111", "motif": "consultation" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let request: Value = test::read_body_json(resp).await;
    assert_eq!(request["id"], "DEM-01");
    assert_eq!(request["status"], "EN_ATTENTE");

    let req = test::TestRequest::post()
        .uri("/api/acces/DEM-01/repondre")
        .insert_header(("Authorization", format!("Bearer {}", patient_session)))
        .set_json(json!({ "decision": "ACCEPTE" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["demande"]["status"], "ACCEPTE");
    assert_eq!(body["acces"]["status"], "ACTIVE");

    let req = test::TestRequest::post()
        .uri("/api/acces/DEM-01/repondre")
        .insert_header(("Authorization", format!("Bearer {}", patient_session)))
        .set_json(json!({ "decision": "REFUSE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/acces")
        .insert_header(("Authorization", format!("Bearer {}", patient_session)))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["medecins"][0]["personne"]["email"], "dr@chu.fr");
    assert_eq!(view["medecins"][0]["tousDossiers"], true);
}

#[actix_web::test]
async fn test_navigation_endpoint() {
    let db = db::connect_in_memory().await.unwrap();
    let config = AppConfig::for_tests();
    common::doctor(&db, &config, "dr@chu.fr", "CHU Lyon").await;
    let app = init_app!(db, config);

    let req = test::TestRequest::get().uri("/api/navigation?path=/dashboard/patient").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "action": "redirect", "target": "/login?next=/dashboard/patient" }));

    let session = login!(app, "dr@chu.fr");
    let req = test::TestRequest::get()
        .uri("/api/navigation?path=/dashboard/patient")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "action": "redirect", "target": "/dashboard/medecin" }));
}
