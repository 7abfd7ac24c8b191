//! Integration tests for the Mimic API
//!
//! These tests drive the HTTP surface end to end against in-memory stores,
//! including the submit, decide and deploy flow.

use axum_test::TestServer;
use mimic_api::{create_router, start_background_server, ApiConfig, AppState};
use mimic_db::Portal;
use serde_json::{json, Value};

/// Create test server over a fresh in-memory portal
fn create_test_server() -> TestServer {
    let portal = Portal::in_memory().unwrap();
    let router = create_router(AppState::new(portal));
    TestServer::new(router).unwrap()
}

async fn submit(server: &TestServer, username: &str, app: &str, version: &str) -> Value {
    let response = server
        .post("/api/v1/requests")
        .json(&json!({ "username": username, "app": app, "version": version }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

fn id_of(body: &Value, field: &str) -> String {
    body[field].as_str().unwrap().to_string()
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["applications"], 4);
    assert_eq!(body["log_entries"], 0);
}

#[tokio::test]
async fn test_background_server_binds_ephemeral_port() {
    let config = ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        enable_cors: false,
    };
    let state = AppState::new(Portal::in_memory().unwrap());

    let addr = start_background_server(config, state).await.unwrap();

    assert!(addr.ip().is_loopback());
    assert_ne!(addr.port(), 0);
}

// ============ Auth Endpoint Tests ============

#[tokio::test]
async fn test_login() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/login")
        .json(&json!({ "username": "bob", "password": "pass" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["role"], "manager");

    let response = server
        .post("/api/v1/login")
        .json(&json!({ "username": "bob", "password": "wrong" }))
        .await;
    response.assert_status_unauthorized();
}

// ============ Catalog Endpoint Tests ============

#[tokio::test]
async fn test_catalog() {
    let server = create_test_server();

    let response = server.get("/api/v1/catalog").await;
    response.assert_status_ok();
    let apps: Vec<Value> = response.json();
    let names: Vec<&str> = apps.iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["MS Excel", "MS Word", "Slack", "Zoom"]);

    let response = server.get("/api/v1/catalog/Zoom").await;
    response.assert_status_ok();
    let zoom: Value = response.json();
    assert_eq!(zoom["versions"], json!(["5.0", "5.1", "latest"]));
    assert_eq!(zoom["latest"], "latest");

    server
        .get("/api/v1/catalog/Photoshop")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_catalog_eligible_versions() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/catalog")
        .add_query_param("username", "alice")
        .await;
    response.assert_status_ok();
    let apps: Vec<Value> = response.json();
    let zoom = apps.iter().find(|a| a["name"] == "Zoom").unwrap();
    assert_eq!(zoom["eligible_versions"], json!(["5.0", "latest"]));
    let word = apps.iter().find(|a| a["name"] == "MS Word").unwrap();
    assert_eq!(word["eligible_versions"], json!([]));
}

// ============ Request Endpoint Tests ============

#[tokio::test]
async fn test_submit_list_get_roundtrip() {
    let server = create_test_server();

    let submitted = submit(&server, "alice", "Zoom", "5.0").await;
    assert_eq!(submitted["status"], "pending");
    let request_id = id_of(&submitted, "request_id");

    let response = server
        .get("/api/v1/requests")
        .add_query_param("username", "alice")
        .await;
    response.assert_status_ok();
    let listed: Vec<Value> = response.json();
    assert_eq!(listed, vec![submitted.clone()]);

    let response = server
        .get(&format!("/api/v1/requests/{}", request_id))
        .add_query_param("username", "alice")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), submitted);
}

#[tokio::test]
async fn test_submit_unknown_version() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/requests")
        .json(&json!({ "username": "alice", "app": "Zoom", "version": "9.9" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_unknown_user_forbidden() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/requests")
        .add_query_param("username", "mallory")
        .await;
    response.assert_status_forbidden();
    assert_eq!(response.json::<Value>()["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_ineligible_approval_stays_pending() {
    let server = create_test_server();

    let submitted = submit(&server, "alice", "Zoom", "5.1").await;
    let request_id = id_of(&submitted, "request_id");

    let response = server
        .post(&format!("/api/v1/requests/{}/decision", request_id))
        .json(&json!({ "username": "bob", "decision": "approve" }))
        .await;
    response.assert_status_forbidden();
    assert_eq!(response.json::<Value>()["code"], "POLICY_VIOLATION");

    let response = server
        .get(&format!("/api/v1/requests/{}", request_id))
        .add_query_param("username", "bob")
        .await;
    assert_eq!(response.json::<Value>()["status"], "pending");
}

#[tokio::test]
async fn test_approve_logs_one_entry_and_blocks_redecide() {
    let server = create_test_server();

    let submitted = submit(&server, "alice", "Zoom", "5.0").await;
    let request_id = id_of(&submitted, "request_id");
    let before = server.get("/health").await.json::<Value>()["log_entries"]
        .as_u64()
        .unwrap();

    let response = server
        .post(&format!("/api/v1/requests/{}/decision", request_id))
        .json(&json!({ "username": "admin", "decision": "approve" }))
        .await;
    response.assert_status_ok();
    let decided: Value = response.json();
    assert_eq!(decided["status"], "approved");
    assert_eq!(decided["decided_by"], "admin");

    let after = server.get("/health").await.json::<Value>()["log_entries"]
        .as_u64()
        .unwrap();
    assert_eq!(after, before + 1);

    let logs: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "admin")
        .add_query_param("limit", "1")
        .await
        .json();
    assert_eq!(logs[0]["log_type"], "system");
    assert!(logs[0]["action"].as_str().unwrap().contains(&request_id));

    let response = server
        .post(&format!("/api/v1/requests/{}/decision", request_id))
        .json(&json!({ "username": "bob", "decision": "reject" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_user_cannot_decide() {
    let server = create_test_server();

    let submitted = submit(&server, "alice", "Zoom", "5.0").await;
    let response = server
        .post(&format!(
            "/api/v1/requests/{}/decision",
            id_of(&submitted, "request_id")
        ))
        .json(&json!({ "username": "alice", "decision": "approve" }))
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_invalid_decision_value() {
    let server = create_test_server();

    let submitted = submit(&server, "alice", "Zoom", "5.0").await;
    let response = server
        .post(&format!(
            "/api/v1/requests/{}/decision",
            id_of(&submitted, "request_id")
        ))
        .json(&json!({ "username": "admin", "decision": "maybe" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_deploy_flow() {
    let server = create_test_server();

    let submitted = submit(&server, "alice", "Zoom", "latest").await;
    let request_id = id_of(&submitted, "request_id");

    // not approved yet
    server
        .post(&format!("/api/v1/requests/{}/deploy", request_id))
        .json(&json!({ "username": "bob" }))
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);

    server
        .post(&format!("/api/v1/requests/{}/decision", request_id))
        .json(&json!({ "username": "bob", "decision": "approve" }))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/v1/requests/{}/deploy", request_id))
        .json(&json!({ "username": "bob" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ticket"]["status"], "closed");
    assert_eq!(body["ticket"]["request_id"], request_id.as_str());
    assert_eq!(body["ticket"]["user"], "alice");

    let installs: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .add_query_param("log_type", "install")
        .await
        .json();
    assert_eq!(installs.len(), 1);
    assert_eq!(installs[0]["app"], "Zoom");
}

#[tokio::test]
async fn test_direct_install() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/install")
        .json(&json!({ "username": "alice", "app": "Zoom", "version": "5.0" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["request"]["status"], "approved");
    assert_eq!(body["ticket"]["status"], "closed");

    server
        .post("/api/v1/install")
        .json(&json!({ "username": "alice", "app": "MS Word", "version": "2021" }))
        .await
        .assert_status_forbidden();

    server
        .post("/api/v1/install")
        .json(&json!({ "username": "alice", "app": "Teams", "version": "1" }))
        .await
        .assert_status_not_found();
}

// ============ Ticket Endpoint Tests ============

#[tokio::test]
async fn test_ticket_lifecycle() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/tickets")
        .json(&json!({ "username": "alice", "action": "install Zoom 5.0" }))
        .await;
    response.assert_status_ok();
    let ticket: Value = response.json();
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["role"], "user");
    let ticket_id = id_of(&ticket, "ticket_id");
    let status_url = format!("/api/v1/tickets/{}/status", ticket_id);

    for status in ["in_progress", "closed"] {
        let response = server
            .post(&status_url)
            .json(&json!({ "username": "bob", "status": status }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], status);
    }

    let response = server
        .post(&status_url)
        .json(&json!({ "username": "bob", "status": "in_progress" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_ticket_visibility() {
    let server = create_test_server();

    let ticket: Value = server
        .post("/api/v1/tickets")
        .json(&json!({ "username": "bob", "action": "replace laptop" }))
        .await
        .json();

    let mine: Vec<Value> = server
        .get("/api/v1/tickets")
        .add_query_param("username", "alice")
        .await
        .json();
    assert!(mine.is_empty());

    server
        .get(&format!("/api/v1/tickets/{}", id_of(&ticket, "ticket_id")))
        .add_query_param("username", "alice")
        .await
        .assert_status_not_found();

    let all: Vec<Value> = server
        .get("/api/v1/tickets")
        .add_query_param("username", "admin")
        .add_query_param("status", "open")
        .await
        .json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_invalid_ticket_status() {
    let server = create_test_server();

    server
        .get("/api/v1/tickets")
        .add_query_param("username", "admin")
        .add_query_param("status", "done")
        .await
        .assert_status_bad_request();
}

// ============ Log Endpoint Tests ============

#[tokio::test]
async fn test_logs_scoped_to_user() {
    let server = create_test_server();

    submit(&server, "alice", "Zoom", "5.0").await;
    submit(&server, "bob", "MS Excel", "2019").await;

    let alice_logs: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .await
        .json();
    assert_eq!(alice_logs.len(), 1);
    assert_eq!(alice_logs[0]["user"], "alice");

    server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .add_query_param("user", "bob")
        .await
        .assert_status_forbidden();

    let excel: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "admin")
        .add_query_param("app", "MS Excel")
        .await
        .json();
    assert_eq!(excel.len(), 1);
    assert_eq!(excel[0]["user"], "bob");
}

#[tokio::test]
async fn test_logs_since_filter() {
    let server = create_test_server();

    submit(&server, "alice", "Zoom", "5.0").await;
    submit(&server, "alice", "Slack", "latest").await;

    let all: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .add_query_param("since", "2000-01-01T00:00:00Z")
        .await
        .json();
    assert_eq!(all.len(), 2);

    let newest = all[0]["timestamp"].as_str().unwrap().to_string();
    let recent: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .add_query_param("since", &newest)
        .await
        .json();
    assert!(!recent.is_empty());
    assert_eq!(recent[0]["entry_id"], all[0]["entry_id"]);
    assert_eq!(recent[0]["app"], "Slack");

    let future: Vec<Value> = server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .add_query_param("since", "2999-01-01T00:00:00Z")
        .await
        .json();
    assert!(future.is_empty());

    server
        .get("/api/v1/logs")
        .add_query_param("username", "alice")
        .add_query_param("since", "yesterday")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_append_log() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/logs")
        .json(&json!({
            "username": "alice",
            "log_type": "chat",
            "action": "asked about VPN"
        }))
        .await;
    response.assert_status_ok();
    let entry: Value = response.json();
    assert_eq!(entry["user"], "alice");
    assert_eq!(entry["log_type"], "chat");

    server
        .post("/api/v1/logs")
        .json(&json!({ "username": "alice", "log_type": "audit", "action": "x" }))
        .await
        .assert_status_bad_request();
}

// ============ File Endpoint Tests ============

#[tokio::test]
async fn test_files_role_gated() {
    let server = create_test_server();

    let files: Vec<Value> = server
        .get("/api/v1/files")
        .add_query_param("username", "alice")
        .await
        .json();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f["is_public"] == true));

    let files: Vec<Value> = server
        .get("/api/v1/files")
        .add_query_param("username", "bob")
        .add_query_param("search", "finance")
        .await
        .json();
    assert_eq!(files.len(), 1);

    server
        .get("/api/v1/files/4/download")
        .add_query_param("username", "alice")
        .await
        .assert_status_forbidden();

    let response = server
        .get("/api/v1/files/2/download")
        .add_query_param("username", "alice")
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "Dummy file: VPN_Guide.pdf");
}

// ============ Export Endpoint Tests ============

#[tokio::test]
async fn test_export_csv() {
    let server = create_test_server();

    submit(&server, "alice", "Zoom", "5.0").await;

    let response = server
        .get("/api/v1/export/requests")
        .add_query_param("username", "alice")
        .await;
    response.assert_status_ok();
    let text = response.text();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,user,app,version,status,created_at,decided_by,decided_at")
    );
    assert!(lines.next().unwrap().contains("Zoom"));

    server
        .get("/api/v1/export/secrets")
        .add_query_param("username", "admin")
        .await
        .assert_status_bad_request();
}

// ============ Agent Endpoint Tests ============

#[tokio::test]
async fn test_agent_install_and_echo() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/agent")
        .json(&json!({ "username": "alice", "message": "install slack" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["kind"], "install");
    assert_eq!(body["request"]["app"], "Slack");
    assert_eq!(body["request"]["version"], "latest");

    let response = server
        .post("/api/v1/agent")
        .json(&json!({ "username": "alice", "message": "good morning" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["kind"], "chat");
    assert_eq!(body["message"], "You said: good morning");
}
