mod common;

use common::spawn_app;
use hostelcare_session::storage::ClientStorage;
use hostelcare_session::{GuardState, Role, View};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{headers, method, path, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn guard_starts_in_loading_state() {
    let app = spawn_app().await;
    let guard = app.ctx.guard(Role::Warden);

    assert_eq!(guard.state(), GuardState::CHECKING);
    assert_eq!(guard.render(), View::Loading("Checking warden session..."));
}

#[tokio::test]
async fn cookie_only_session_is_admitted_without_refresh() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/admin/profile"))
        .and(headers(
            "cache-control",
            vec!["no-cache", "no-store", "must-revalidate"],
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "admin": {"email": "root@hostel.gov", "name": "Root"}
        })))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/admin/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::Admin);
    let view = guard.mount("/admin/welcome").await;

    assert_eq!(view, View::Children);
    assert_eq!(guard.state(), GuardState::AUTHORIZED);
    let stored: serde_json::Value =
        serde_json::from_str(&app.local.get("admin_data").unwrap()).unwrap();
    assert_eq!(stored["email"], "root@hostel.gov");
    assert!(app.redirects().is_empty());
}

#[tokio::test]
async fn profile_check_is_cache_busted() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/auth/warden/profile"))
        .and(query_param_is_missing("_t"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/warden/profile"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"warden": {"mail": "w@hostel.gov"}})),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::Warden);
    assert_eq!(guard.mount("/warden/dashboard").await, View::Children);
    assert!(app.local.contains("warden_data"));
    assert!(app.local.contains("warden"));
}

#[tokio::test]
async fn expired_access_is_recovered_through_refresh() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/auth/user/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/user/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "user": {"shid": "STU1ID001", "name": "A"}
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::User);
    let view = guard.mount("/dashboard").await;

    assert_eq!(view, View::Children);
    assert_eq!(app.local.get("shid"), Some("STU1ID001".to_string()));
    assert!(app.redirects().is_empty());
}

#[tokio::test]
async fn failed_refresh_redirects_to_login() {
    let app = spawn_app().await;
    app.local
        .set("user_data", json!({"shid": "STU1ID001"}).to_string());
    app.local.set("shid", "STU1ID001".to_string());

    Mock::given(method("GET"))
        .and(path("/auth/user/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/user/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::User);
    let view = guard.mount("/dashboard").await;

    assert_eq!(
        view,
        View::Redirect {
            to: "/register".to_string(),
            replace: true
        }
    );
    assert_eq!(guard.state(), GuardState::UNAUTHORIZED);
    assert!(!app.local.contains("user_data"));
    assert!(!app.local.contains("shid"));
}

#[tokio::test]
async fn unreachable_api_counts_as_signed_out() {
    let app = common::spawn_app_with(|settings| settings.api.timeout_secs = 1).await;

    Mock::given(method("GET"))
        .and(path("/auth/warden/profile"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/warden/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::Warden);
    let view = guard.mount("/warden/dashboard").await;

    assert_eq!(
        view,
        View::Redirect {
            to: "/warden/login".to_string(),
            replace: false
        }
    );
}

#[tokio::test]
async fn server_error_counts_as_signed_out() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/admin/profile"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::Admin);
    assert!(matches!(
        guard.mount("/admin/welcome").await,
        View::Redirect { .. }
    ));
}

#[tokio::test]
async fn profile_without_principal_counts_as_signed_out() {
    let app = spawn_app().await;
    app.local
        .set("admin_data", json!({"email": "stale@hostel.gov"}).to_string());

    Mock::given(method("GET"))
        .and(path("/admin/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::Admin);
    let view = guard.mount("/admin/welcome").await;

    assert_eq!(
        view,
        View::Redirect {
            to: "/admin/login".to_string(),
            replace: false
        }
    );
    assert!(!app.local.contains("admin_data"));
}

#[tokio::test]
async fn student_guard_rechecks_on_every_path_change() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/auth/user/profile"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": {"shid": "STU1ID001"}})),
        )
        .expect(2)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::User);
    assert_eq!(guard.mount("/dashboard").await, View::Children);
    assert_eq!(guard.navigate("/dashboard").await, View::Children);
    assert_eq!(guard.navigate("/complaints/new").await, View::Children);
}

#[tokio::test]
async fn admin_guard_checks_once_per_mount() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/admin/profile"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"admin": {"email": "root@hostel.gov"}})),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let mut guard = app.ctx.guard(Role::Admin);
    assert_eq!(guard.mount("/admin/welcome").await, View::Children);
    assert_eq!(guard.navigate("/admin/users").await, View::Children);
    assert_eq!(guard.navigate("/admin/settings").await, View::Children);
}
