//! Wire-level tests for the manager HTTP gateway against a mock endpoint.

mod common;

use chrono::{Duration, Utc};
use common::user;
use mt5_bridge::error::AppError;
use mt5_bridge::gateway::{ManagerGateway, ManagerHttpGateway};

async fn connected_gateway(server: &mockito::ServerGuard) -> ManagerHttpGateway {
    let gateway = ManagerHttpGateway::new();
    gateway
        .connect(&server.url(), 1000, "manager-pw")
        .await
        .unwrap();
    gateway
}

async fn login_mock(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/api/manager/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"session-token"}"#)
        .create_async().await
}

#[tokio::test]
async fn calls_before_connect_fail_fast() {
    let gateway = ManagerHttpGateway::new();
    assert!(matches!(
        gateway.fetch_user(10).await,
        Err(AppError::NotConnected)
    ));
}

#[tokio::test]
async fn connect_rejects_bad_credentials() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/manager/login")
        .with_status(401)
        .with_body("bad credentials")
        .create_async().await;

    let gateway = ManagerHttpGateway::new();
    let result = gateway.connect(&server.url(), 1000, "wrong").await;
    assert!(matches!(result, Err(AppError::Backend { .. })));
}

#[tokio::test]
async fn fetch_user_round_trips_and_sends_the_token() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let record = user(10, "real", 100, 67);
    let _mock = server
        .mock("GET", "/api/manager/users/10")
        .match_header("authorization", "Bearer session-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&record).unwrap())
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    let fetched = gateway.fetch_user(10).await.unwrap().unwrap();
    assert_eq!(fetched.login, 10);
    assert_eq!(fetched.group, "real");
    assert_eq!(fetched.rights, 67);
}

#[tokio::test]
async fn missing_user_maps_to_none() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let _mock = server
        .mock("GET", "/api/manager/users/999")
        .with_status(404)
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    assert!(gateway.fetch_user(999).await.unwrap().is_none());
}

#[tokio::test]
async fn backend_errors_carry_operation_context() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let _mock = server
        .mock("GET", "/api/manager/users/10")
        .with_status(500)
        .with_body("internal")
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    match gateway.fetch_user(10).await {
        Err(AppError::Backend { operation, detail }) => {
            assert_eq!(operation, "fetch_user");
            assert!(detail.contains("500"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn group_members_are_queried_by_parameter() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let members = vec![user(10, "real\\VIP A", 200, 67)];
    let _mock = server
        .mock("GET", "/api/manager/group-users")
        .match_query(mockito::Matcher::UrlEncoded(
            "group".into(),
            "real\\VIP A".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&members).unwrap())
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    let fetched = gateway.fetch_users_in_group("real\\VIP A").await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].login, 10);
}

#[tokio::test]
async fn unknown_group_reads_as_empty() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let _mock = server
        .mock("GET", "/api/manager/group-users")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    assert!(
        gateway
            .fetch_users_in_group("real\\Ghost")
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn balance_submission_reports_the_backend_outcome() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let _mock = server
        .mock("POST", "/api/manager/balance")
        .match_header("authorization", "Bearer session-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":false}"#)
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    let outcome = gateway
        .submit_balance_op(10, 250.0, 2, "withdrawal", false)
        .await
        .unwrap();
    assert!(!outcome);
}

#[tokio::test]
async fn deals_are_fetched_with_the_requested_range() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let _mock = server
        .mock("GET", "/api/manager/users/10/deals")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    let to = Utc::now();
    let from = to - Duration::days(7);
    assert!(gateway.fetch_deals(10, from, to).await.unwrap().is_empty());
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let _login = login_mock(&mut server).await;
    let _logout = server
        .mock("POST", "/api/manager/logout")
        .with_status(200)
        .create_async().await;

    let gateway = connected_gateway(&server).await;
    gateway.disconnect().await.unwrap();
    gateway.disconnect().await.unwrap();
    // Session gone: subsequent calls fail fast
    assert!(matches!(
        gateway.fetch_user(10).await,
        Err(AppError::NotConnected)
    ));
}
