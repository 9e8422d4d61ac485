//! Integration tests for the zhiyuan-web API
//!
//! Each test runs the full router against a fresh temporary database,
//! covering the auth flow, the recommendation endpoint (including the
//! seeded sample data), analysis, announcements, profiles, wishlists
//! and the admin guards.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method
use zhiyuan_common::db::{bootstrap_admin, init_database};
use zhiyuan_web::{build_router, AppState};

/// Test helper: fresh database in a temp dir + router over it
async fn setup() -> (TempDir, SqlitePool, Router) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("admissions.db"))
        .await
        .expect("init database");
    let app = build_router(AppState::new(pool.clone()));
    (dir, pool, app)
}

/// Test helper: percent-encode a path or query segment (UTF-8 safe)
fn encode(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Test helper: extract JSON body from a response body
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

/// Test helper: register an account and log in, returning the session
/// cookie pair
async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    login(app, username, password).await
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "username": username, "password": password }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (_dir, _pool, app) = setup().await;

    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "zhiyuan-web");
    assert!(body["version"].is_string());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (_dir, _pool, app) = setup().await;

    let response = app
        .clone()
        .oneshot(form_request("/api/recommend", "rank=5000&province=x&exam_type=y", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/profile", Some("zhiyuan_session=bogus-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation() {
    let (_dir, _pool, app) = setup().await;

    // Username too short
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &json!({ "username": "ab", "email": "a@example.com", "password": "secret9" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &json!({ "username": "student", "email": "nope", "password": "secret9" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Short password
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &json!({ "username": "student", "email": "a@example.com", "password": "12345" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_conflict() {
    let (_dir, _pool, app) = setup().await;

    let body = json!({ "username": "student", "email": "s@example.com", "password": "secret9" });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request("POST", "/api/auth/register", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (_dir, _pool, app) = setup().await;
    register_and_login(&app, "student", "secret9").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "username": "student", "password": "wrong" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "username": "nobody", "password": "secret9" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", &json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/profile", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Recommendation endpoint
// =============================================================================

#[tokio::test]
async fn test_recommend_against_seeded_data() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    // Seeded 物理类/广东 programs: 中山大学 4500, 华南理工大学 5200, 深圳大学 8500.
    // At rank 10000 every program is a safety; 深圳大学 has the highest
    // probability, and the two zero-probability ties order by average rank.
    let response = app
        .oneshot(form_request(
            "/api/recommend",
            "rank=10000&province=广东&exam_type=物理类",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["reach"].as_array().unwrap().len(), 0);
    assert_eq!(body["match"].as_array().unwrap().len(), 0);

    let safety = body["safety"].as_array().unwrap();
    assert_eq!(safety.len(), 3);
    assert_eq!(safety[0]["school"], "深圳大学");
    assert_eq!(safety[0]["probability"], 32);
    assert_eq!(safety[1]["school"], "中山大学");
    assert_eq!(safety[1]["probability"], 0);
    assert_eq!(safety[1]["avg_rank"], 4500);
    assert_eq!(safety[2]["school"], "华南理工大学");
    assert_eq!(safety[2]["probability"], 0);
}

#[tokio::test]
async fn test_recommend_spreads_across_tiers() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    // At rank 5000: 深圳大学 (avg 8500) is a reach, 华南理工大学 (5200)
    // a match, 中山大学 (4500) a safety.
    let response = app
        .oneshot(form_request(
            "/api/recommend",
            "rank=5000&province=广东&exam_type=物理类",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let reach = body["reach"].as_array().unwrap();
    let matches = body["match"].as_array().unwrap();
    let safety = body["safety"].as_array().unwrap();

    assert_eq!(reach.len(), 1);
    assert_eq!(reach[0]["school"], "深圳大学");
    assert_eq!(reach[0]["probability"], 91);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["school"], "华南理工大学");
    assert_eq!(matches[0]["probability"], 54);

    assert_eq!(safety.len(), 1);
    assert_eq!(safety[0]["school"], "中山大学");
    assert_eq!(safety[0]["probability"], 39);
}

#[tokio::test]
async fn test_recommend_no_matching_data_returns_empty_tiers() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let response = app
        .oneshot(form_request(
            "/api/recommend",
            "rank=5000&province=西藏&exam_type=物理类",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["reach"].as_array().unwrap().len(), 0);
    assert_eq!(body["match"].as_array().unwrap().len(), 0);
    assert_eq!(body["safety"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recommend_invalid_rank_rejected() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let response = app
        .clone()
        .oneshot(form_request(
            "/api/recommend",
            "rank=0&province=广东&exam_type=物理类",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(form_request(
            "/api/recommend",
            "rank=abc&province=广东&exam_type=物理类",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_recommend_get_with_query_parameters() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let uri = format!(
        "/api/recommend?rank=10000&province={}&exam_type={}",
        encode("广东"),
        encode("物理类")
    );
    let response = app.oneshot(get_request(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["safety"].as_array().unwrap().len(), 3);
}

// =============================================================================
// Analysis endpoint
// =============================================================================

#[tokio::test]
async fn test_analysis_single_year_history() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let uri = format!(
        "/api/analysis/{}/{}?province={}&exam_type={}&student_rank=10000",
        encode("中山大学"),
        encode("计算机科学与技术"),
        encode("广东"),
        encode("物理类")
    );
    let response = app.oneshot(get_request(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["school"], "中山大学");
    assert_eq!(body["historical_data"].as_array().unwrap().len(), 1);
    assert_eq!(body["trend"], "stable");
    assert_eq!(body["predicted_rank"], 4500);
    assert_eq!(body["predicted_range"]["min"], 4500);
    assert_eq!(body["predicted_range"]["max"], 4500);
    assert_eq!(body["volatility"], "low");
    assert_eq!(body["volatility_value"], 0);
    // Rank 10000 is past the whole interval: high risk
    assert_eq!(body["risk_assessment"], "high");
}

#[tokio::test]
async fn test_analysis_unknown_program_404() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let uri = format!(
        "/api/analysis/{}/{}?province={}&exam_type={}",
        encode("不存在大学"),
        encode("不存在专业"),
        encode("广东"),
        encode("物理类")
    );
    let response = app.oneshot(get_request(&uri, Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_defaults_and_update() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/profile", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["province"], "广东");
    assert_eq!(body["exam_type"], "物理类");
    assert_eq!(body["last_rank"], 10000);

    // Update; rank below 1 gets clamped
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            &json!({ "province": "湖南", "exam_type": "历史类", "rank": 0 }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/profile", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["province"], "湖南");
    assert_eq!(body["exam_type"], "历史类");
    assert_eq!(body["last_rank"], 1);

    // Empty province rejected
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            &json!({ "province": " ", "exam_type": "历史类", "rank": 5000 }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_favorites_lifecycle() {
    let (_dir, _pool, app) = setup().await;
    let cookie = register_and_login(&app, "student", "secret9").await;

    // Create with an unknown category: falls back to "match"
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/favorites",
            &json!({ "school": "中山大学", "major": "计算机科学与技术", "category": "稳" }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Duplicate school+major rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/favorites",
            &json!({ "school": "中山大学", "major": "计算机科学与技术" }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/favorites",
            &json!({ "school": "深圳大学", "major": "电子信息工程", "category": "safety" }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/favorites", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["school"], "中山大学");
    assert_eq!(items[0]["category"], "match");
    assert_eq!(items[1]["category"], "safety");

    let first = items[0]["guid"].as_str().unwrap().to_string();
    let second = items[1]["guid"].as_str().unwrap().to_string();

    // Update with no fields → 400; bad category → 400
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/favorites/{first}"),
            &json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/favorites/{first}"),
            &json!({ "category": "冲" }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid update
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/favorites/{first}"),
            &json!({ "category": "reach", "note": "首选" }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Reorder: second entry first
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/favorites/reorder",
            &json!({ "ordered_guids": [second, first] }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/favorites", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let items = body.as_array().unwrap();
    assert_eq!(items[0]["school"], "深圳大学");
    assert_eq!(items[1]["category"], "reach");
    assert_eq!(items[1]["note"], "首选");

    // Empty reorder rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/favorites/reorder",
            &json!({ "ordered_guids": [] }),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Delete, then delete again → 404
    let guid = items[0]["guid"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/favorites/{guid}"),
            &json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/favorites/{guid}"),
            &json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_are_scoped_per_user() {
    let (_dir, _pool, app) = setup().await;
    let alice = register_and_login(&app, "alice01", "secret9").await;
    let bob = register_and_login(&app, "bob0001", "secret9").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/favorites",
            &json!({ "school": "暨南大学", "major": "新闻学" }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let guid = extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string();

    // Bob sees nothing and cannot delete Alice's entry
    let response = app
        .clone()
        .oneshot(get_request("/api/favorites", Some(&bob)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/favorites/{guid}"),
            &json!({}),
            Some(&bob),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Announcements
// =============================================================================

#[tokio::test]
async fn test_announcements_publish_and_listing() {
    let (_dir, pool, app) = setup().await;
    bootstrap_admin(&pool, Some("admin-secret")).await.unwrap();
    let admin = login(&app, "admin", "admin-secret").await;
    let student = register_and_login(&app, "student", "secret9").await;

    // Plain, pinned and already-expired announcements
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/announcements",
            &json!({ "title": "志愿填报指南更新", "content": "新增热门专业解读<br>点击查看" }),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let plain_guid = extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/announcements",
            &json!({ "title": "系统维护通知", "content": "6月15日升级", "is_pinned": true }),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/announcements",
            &json!({
                "title": "过期公告",
                "content": "早已过期",
                "expire_time": "2020-01-01T00:00:00+00:00",
            }),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Students see the two live ones, pinned first
    let response = app
        .clone()
        .oneshot(get_request("/api/announcements", Some(&student)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "系统维护通知");

    // Latest view carries plain-text summaries
    let response = app
        .clone()
        .oneshot(get_request("/api/announcements/latest", Some(&student)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    let plain = items
        .iter()
        .find(|i| i["title"] == "志愿填报指南更新")
        .unwrap();
    assert_eq!(plain["summary"], "新增热门专业解读 点击查看");

    // Admin deletes; a second delete is a 404
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/announcements/{plain_guid}"),
            &json!({}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/announcements/{plain_guid}"),
            &json!({}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Admin guards and user management
// =============================================================================

#[tokio::test]
async fn test_admin_routes_refuse_students_and_anonymous() {
    let (_dir, _pool, app) = setup().await;
    let student = register_and_login(&app, "student", "secret9").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/admin/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/admin/users", Some(&student)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_user_management() {
    let (_dir, pool, app) = setup().await;
    bootstrap_admin(&pool, Some("admin-secret")).await.unwrap();
    let admin = login(&app, "admin", "admin-secret").await;
    register_and_login(&app, "student", "secret9").await;

    // Both accounts listed
    let response = app
        .clone()
        .oneshot(get_request("/api/admin/users", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);

    let admin_guid = list
        .iter()
        .find(|u| u["username"] == "admin")
        .unwrap()["guid"]
        .as_str()
        .unwrap()
        .to_string();
    let student_guid = list
        .iter()
        .find(|u| u["username"] == "student")
        .unwrap()["guid"]
        .as_str()
        .unwrap()
        .to_string();

    // Self-deletion refused
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/users/{admin_guid}"),
            &json!({}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown action refused
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/admin/users/{student_guid}/role"),
            &json!({ "action": "crown" }),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Promote, then deleting a fellow admin is refused
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/admin/users/{student_guid}/role"),
            &json!({ "action": "promote" }),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/users/{student_guid}"),
            &json!({}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Demote and delete
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/admin/users/{student_guid}/role"),
            &json!({ "action": "demote" }),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/users/{student_guid}"),
            &json!({}),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/admin/users", Some(&admin)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
