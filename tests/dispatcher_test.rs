//! HTTP-level behavior: authentication gate, envelope shape, status codes.

mod common;

use actix_web::middleware::from_fn;
use actix_web::{App, test, web};
use common::{MockGateway, single_seed_catalog, user};
use mt5_bridge::config::{SecurityConfig, StorageConfig};
use mt5_bridge::server::{AppState, auth, routes};
use mt5_bridge::service::{DirectoryService, ManagerDirectoryService};
use mt5_bridge::storage::GroupStore;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

fn app_state(gateway: Arc<MockGateway>, security: SecurityConfig, dir: &TempDir) -> AppState {
    let store = Arc::new(GroupStore::new(&StorageConfig {
        store_file: dir
            .path()
            .join("created_groups.json")
            .display()
            .to_string(),
        baseline_file: None,
    }));
    store.load();
    let service: Arc<dyn DirectoryService> = Arc::new(ManagerDirectoryService::new(
        gateway,
        single_seed_catalog("real"),
        store,
    ));
    AppState { service, security }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure)
                .default_service(web::route().to(routes::endpoint_not_found))
                .wrap(from_fn(auth::authenticate)),
        )
        .await
    };
}

fn open_security() -> SecurityConfig {
    SecurityConfig::new(false, HashSet::new())
}

macro_rules! connect {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/connect")
            .set_json(json!({
                "server": "mt5.example.com",
                "login": 1000,
                "password": "manager-pw"
            }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert!(resp.status().is_success());
    }};
}

#[actix_web::test]
async fn status_starts_disconnected() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), open_security(), &dir));

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["connected"], false);
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn connect_then_listing_users_succeeds() {
    let gateway = Arc::new(MockGateway::with_users(vec![
        user(10, "real", 100, 67),
        user(20, "real", 100, 67),
    ]));
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(gateway, open_security(), &dir));

    connect!(&app);

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["connected"], true);

    let req = test::TestRequest::get().uri("/api/users").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["discovery_stats"]["from_seed_groups"], 2);
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn operations_before_connect_return_error_envelope() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), open_security(), &dir));

    let req = test::TestRequest::get().uri("/api/user/10").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Not connected")
    );
}

#[actix_web::test]
async fn missing_or_wrong_api_key_is_rejected_on_every_path() {
    let dir = TempDir::new().unwrap();
    let security = SecurityConfig::new(true, HashSet::new());
    let app = init_app!(app_state(Arc::new(MockGateway::new()), security, &dir));

    for uri in ["/api/status", "/api/users", "/api/nonexistent"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "no key on {uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Missing API key"));
    }

    let req = test::TestRequest::get()
        .uri("/api/status")
        .insert_header(("X-API-Key", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid API key"));
}

#[actix_web::test]
async fn generated_key_is_accepted_in_header_and_query() {
    let dir = TempDir::new().unwrap();
    let security = SecurityConfig::new(true, HashSet::new());
    // Exactly one key was generated
    assert_eq!(security.api_keys.len(), 1);
    let key = security.api_keys.iter().next().unwrap().clone();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), security, &dir));

    let req = test::TestRequest::get()
        .uri("/api/status")
        .insert_header(("X-API-Key", key.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri(&format!("/api/status?api_key={key}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn preflight_is_answered_without_authentication() {
    let dir = TempDir::new().unwrap();
    let security = SecurityConfig::new(true, HashSet::new());
    let app = init_app!(app_state(Arc::new(MockGateway::new()), security, &dir));

    let req = test::TestRequest::with_uri("/api/users")
        .method(actix_web::http::Method::OPTIONS)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn malformed_login_is_a_400() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), open_security(), &dir));
    connect!(&app);

    let req = test::TestRequest::get()
        .uri("/api/user/not-a-number")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid login"));
}

#[actix_web::test]
async fn unknown_route_is_a_404_envelope() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), open_security(), &dir));

    let req = test::TestRequest::get().uri("/api/unknown").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Endpoint not found");
}

#[actix_web::test]
async fn missing_user_is_a_success_envelope_with_message() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), open_security(), &dir));
    connect!(&app);

    let req = test::TestRequest::get().uri("/api/user/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "User not found");
}

#[actix_web::test]
async fn group_lifecycle_over_http() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(Arc::new(MockGateway::new()), open_security(), &dir));
    connect!(&app);

    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(json!({ "name": "real\\FromApi", "leverage": 300 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "real\\FromApi");
    assert_eq!(body["data"]["leverage"], 300);
    assert_eq!(body["data"]["commission"], 7.0);

    // Listing includes the new group even though it has no members
    let req = test::TestRequest::get().uri("/api/groups").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"real\\FromApi"));

    // Update through the name route (URL-encoded backslash)
    let req = test::TestRequest::post()
        .uri("/api/group/real%5CFromApi")
        .set_json(json!({ "leverage": 500 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["leverage"], 500);

    // Detail reflects the persisted update
    let req = test::TestRequest::get()
        .uri("/api/group/real%5CFromApi")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["leverage"], 500);

    // Duplicate creation is rejected
    let req = test::TestRequest::post()
        .uri("/api/groups")
        .set_json(json!({ "name": "real\\FromApi" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[actix_web::test]
async fn balance_endpoint_reports_rights_failures() {
    let gateway = Arc::new(MockGateway::with_users(vec![user(77, "real", 100, 0)]));
    let dir = TempDir::new().unwrap();
    let app = init_app!(app_state(gateway, open_security(), &dir));
    connect!(&app);

    let req = test::TestRequest::post()
        .uri("/api/balance")
        .set_json(json!({ "login": 77, "amount": 100.0, "comment": "bonus" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("no trading rights"));
}
