//! End-to-end tests of the ban gate and the ban management API
//!
//! Run with: cargo test -p integration-tests --test gate_tests

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use integration_tests::{test_config, CreateBanBody, TestApp, TestRequest};
use ipban_core::entities::BanMode;
use ipban_core::value_objects::UserClass;
use ipban_service::{EnforcementGate, GateOutcome};
use serde_json::Value;

const SESSION: &str = "/api/v1/session";
const BANS: &str = "/api/v1/ip-bans";

// ============================================================================
// Gate
// ============================================================================

#[tokio::test]
async fn test_block_ghost_and_clear_scenario() {
    let app = TestApp::new();
    let ghost_expiry = Utc::now() + Duration::hours(1);
    app.bans.seed("192.168.1.100", BanMode::Block, "spam", None);
    app.bans
        .seed("10.0.0.0/8", BanMode::Ghost, "flood", Some(ghost_expiry));

    let blocked = app.get(SESSION, "192.168.1.100", None).await.unwrap();
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
    assert!(blocked.content_type.starts_with("text/html"));
    assert_eq!(blocked.text(), "192.168.1.100 banned until never by admin: spam");

    let ghosted: Value = app
        .get(SESSION, "10.5.5.5", None)
        .await
        .unwrap()
        .expect_json(StatusCode::OK)
        .unwrap();
    assert_eq!(ghosted["class"], "ghost");
    assert_eq!(ghosted["permission_names"], serde_json::json!(["VIEW_CONTENT"]));
    assert_eq!(ghosted["ban_notice"]["mode"], "ghost");
    assert_eq!(
        ghosted["ban_notice"]["message"],
        format!(
            "10.0.0.0/8 banned until {} by admin: flood",
            ghost_expiry.format("%Y-%m-%d %H:%M:%S")
        )
    );

    let clear: Value = app
        .get(SESSION, "8.8.8.8", None)
        .await
        .unwrap()
        .expect_json(StatusCode::OK)
        .unwrap();
    assert_eq!(clear["class"], "anonymous");
    assert!(clear.get("ban_notice").is_none());

    // Once the ghost ban lapses the range is clear again, the exact ban is not
    let gate = EnforcementGate::new(app.context());
    assert_eq!(
        gate.enforce("10.5.5.5", ghost_expiry).await.unwrap(),
        GateOutcome::Clear
    );
    assert!(gate
        .enforce("192.168.1.100", ghost_expiry)
        .await
        .unwrap()
        .is_terminal());
}

#[tokio::test]
async fn test_health_routes_skip_the_gate() {
    let app = TestApp::new();
    app.bans.seed("192.168.1.100", BanMode::Block, "spam", None);

    let response = app.get("/health", "192.168.1.100", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let ready: Value = app
        .get("/health/ready", "192.168.1.100", None)
        .await
        .unwrap()
        .expect_json(StatusCode::OK)
        .unwrap();
    assert_eq!(ready["checks"]["database"], "healthy");
}

#[tokio::test]
async fn test_ipv6_and_mapped_addresses() {
    let app = TestApp::new();
    app.bans.seed("2001:db8::/32", BanMode::Firewall, "scan", None);
    app.bans.seed("192.0.2.1", BanMode::Block, "spam", None);

    let response = app.get(SESSION, "[2001:db8::5]:1234", None).await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Same leading bits, other family
    let response = app.get(SESSION, "32.1.13.184", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get(SESSION, "::ffff:192.0.2.1", None).await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_exact_ban_beats_covering_range() {
    let app = TestApp::new();
    app.bans.seed("10.0.0.0/8", BanMode::Ghost, "range", None);
    app.bans.seed("10.1.2.3", BanMode::Block, "exact", None);

    let response = app.get(SESSION, "10.1.2.3", None).await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.text().ends_with("exact"));

    let response = app.get(SESSION, "10.1.2.4", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_contact_link_in_notice() {
    let mut config = test_config();
    config.ipban.contact_link = Some("mailto:staff@example.org".to_string());
    let app = TestApp::with_config(config);
    app.bans.seed("192.168.1.100", BanMode::Block, "spam", None);

    let response = app.get(SESSION, "192.168.1.100", None).await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.text().ends_with(
        "spam<a href='mailto:staff@example.org'>Contact the staff (be sure to include this message)</a>"
    ));
}

#[tokio::test]
async fn test_gate_fails_open_when_store_is_down() {
    let app = TestApp::new();
    app.bans.seed("192.168.1.100", BanMode::Block, "spam", None);
    app.bans.set_unavailable(true);

    let response = app.get(SESSION, "192.168.1.100", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/health/ready", "192.168.1.100", None).await.unwrap();
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_without_peer_address_passes() {
    let app = TestApp::new();
    app.bans.seed("192.168.1.100", BanMode::Block, "spam", None);

    let response = app
        .send(TestRequest::new(Method::GET, SESSION))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_ghost_ban_downgrades_signed_in_admin() {
    let app = TestApp::new();
    app.bans.seed("10.0.0.0/8", BanMode::Ghost, "flood", None);
    let token = app.admin_token();

    let session: Value = app
        .get(SESSION, "10.5.5.5", Some(&token))
        .await
        .unwrap()
        .expect_json(StatusCode::OK)
        .unwrap();
    assert_eq!(session["user_id"], 1);
    assert_eq!(session["class"], "ghost");

    let response = app
        .post(BANS, "10.5.5.5", Some(&token), &CreateBanBody::new("1.2.3.4", "block", "spam"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.bans.len(), 1);
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .get(SESSION, "8.8.8.8", Some("not-a-jwt"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Ban management
// ============================================================================

#[tokio::test]
async fn test_add_and_remove_take_effect_immediately() {
    let app = TestApp::new();
    let token = app.admin_token();

    // Warm the cache with an empty index
    let response = app.get(SESSION, "198.51.100.7", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let created: Value = app
        .post(
            BANS,
            "203.0.113.5",
            Some(&token),
            &CreateBanBody::new(" 198.51.100.7 ", "block", "  spam  "),
        )
        .await
        .unwrap()
        .expect_json(StatusCode::CREATED)
        .unwrap();
    assert_eq!(created["target"], "198.51.100.7");
    assert_eq!(created["reason"], "spam");
    assert_eq!(created["banned_by"], 1);
    assert!(created["expires_at"].is_null());

    let response = app.get(SESSION, "198.51.100.7", None).await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let id = created["id"].as_i64().unwrap();
    let response = app
        .delete(&format!("{BANS}/{id}"), "203.0.113.5", Some(&token))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.get(SESSION, "198.51.100.7", None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_bans_with_banner_names() {
    let app = TestApp::new();
    let token = app.admin_token();

    let in_an_hour = Utc::now() + Duration::hours(1);
    for (target, mode) in [("10.0.0.0/8", "ghost"), ("2001:db8::1", "firewall")] {
        app.post(
            BANS,
            "203.0.113.5",
            Some(&token),
            &CreateBanBody::new(target, mode, "spam").until(in_an_hour),
        )
        .await
        .unwrap()
        .expect_json::<Value>(StatusCode::CREATED)
        .unwrap();
    }
    app.bans.seed(
        "192.0.2.9",
        BanMode::Block,
        "old",
        Some(Utc::now() - Duration::hours(1)),
    );

    let active: Value = app
        .get(BANS, "203.0.113.5", Some(&token))
        .await
        .unwrap()
        .expect_json(StatusCode::OK)
        .unwrap();
    let data = active["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["banner"], "admin");
    assert_eq!(active["pagination"]["has_more"], false);

    let everything: Value = app
        .get(&format!("{BANS}?all=true&limit=2"), "203.0.113.5", Some(&token))
        .await
        .unwrap()
        .expect_json(StatusCode::OK)
        .unwrap();
    assert_eq!(everything["data"][0]["target"], "192.0.2.9");
    assert_eq!(everything["pagination"]["has_more"], true);

    let response = app
        .get(&format!("{BANS}?limit=500"), "203.0.113.5", Some(&token))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ban_routes_require_ban_permission() {
    let app = TestApp::new();
    let user_token = app.token(7, UserClass::User);

    let response = app.get(BANS, "8.8.8.8", Some(&user_token)).await.unwrap();
    let body: Value = response.expect_json(StatusCode::FORBIDDEN).unwrap();
    assert_eq!(body["error"]["code"], "MISSING_PERMISSIONS");

    let response = app.get(BANS, "8.8.8.8", None).await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post(BANS, "8.8.8.8", Some(&user_token), &CreateBanBody::new("1.2.3.4", "block", "x"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(app.bans.is_empty());

    let response = app
        .delete(&format!("{BANS}/1"), "8.8.8.8", Some(&user_token))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_ban_rejects_bad_input() {
    let app = TestApp::new();
    let token = app.admin_token();

    let response = app
        .post(BANS, "8.8.8.8", Some(&token), &CreateBanBody::new("10.0.0.0/33", "block", "x"))
        .await
        .unwrap();
    let body: Value = response.expect_json(StatusCode::BAD_REQUEST).unwrap();
    assert_eq!(body["error"]["code"], "INVALID_BAN_TARGET");

    let response = app
        .post(BANS, "8.8.8.8", Some(&token), &CreateBanBody::new("1.2.3.4", "kick", "x"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            BANS,
            "8.8.8.8",
            Some(&token),
            &CreateBanBody::new("1.2.3.4", "block", "x").until(Utc::now() - Duration::minutes(5)),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(BANS, "8.8.8.8", Some(&token), &CreateBanBody::new("1.2.3.4", "block", ""))
        .await
        .unwrap();
    let body: Value = response.expect_json(StatusCode::BAD_REQUEST).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    assert!(app.bans.is_empty());
}

#[tokio::test]
async fn test_delete_missing_or_malformed_id() {
    let app = TestApp::new();
    let token = app.admin_token();

    let response = app
        .delete(&format!("{BANS}/999"), "8.8.8.8", Some(&token))
        .await
        .unwrap();
    let body: Value = response.expect_json(StatusCode::NOT_FOUND).unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let response = app
        .delete(&format!("{BANS}/abc"), "8.8.8.8", Some(&token))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
