//! zhiyuan-web library - College application recommendation service
//!
//! JSON HTTP API over the shared SQLite store: tiered recommendations,
//! rank analysis, accounts with cookie sessions, announcements and
//! per-user wishlists.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod analysis;
pub mod api;
pub mod db;
pub mod engine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// Three route groups: admin (session + admin role), protected
/// (session) and public (none).
pub fn build_router(state: AppState) -> Router {
    // Admin routes (session + admin role)
    let admin = Router::new()
        .route("/api/admin/users", get(api::admin::list_users))
        .route(
            "/api/admin/users/:guid",
            axum::routing::delete(api::admin::delete_user),
        )
        .route("/api/admin/users/:guid/role", post(api::admin::set_user_role))
        .route("/api/admin/announcements", post(api::admin::create_announcement))
        .route(
            "/api/admin/announcements/:guid",
            axum::routing::delete(api::admin::delete_announcement),
        )
        .layer(middleware::from_fn(api::auth::require_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_session,
        ));

    // Protected routes (valid session required)
    let protected = Router::new()
        .route(
            "/api/recommend",
            get(api::recommend::recommend).post(api::recommend::recommend),
        )
        .route("/api/analysis/:school/:major", get(api::analysis::school_analysis))
        .route(
            "/api/profile",
            get(api::profile::get_profile).put(api::profile::update_profile),
        )
        .route("/api/announcements", get(api::announcements::list_announcements))
        .route(
            "/api/announcements/latest",
            get(api::announcements::latest_announcements),
        )
        .route(
            "/api/favorites",
            get(api::favorites::list_favorites).post(api::favorites::create_favorite),
        )
        .route("/api/favorites/reorder", post(api::favorites::reorder_favorites))
        .route(
            "/api/favorites/:guid",
            put(api::favorites::update_favorite).delete(api::favorites::delete_favorite),
        )
        .route("/api/auth/logout", post(api::auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_session,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .merge(api::health::health_routes());

    // Combine routers
    Router::new()
        .merge(admin)
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
