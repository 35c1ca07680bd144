use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The `/ngo/...` and `/admin/login` paths
/// here are exactly the access gate's public set, so the gate lets them through even
/// though they sit under guarded prefixes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Home. The gate sends signed-in non-NGO accounts here from the NGO area.
        .route("/", get(|| async { "Changify API" }))
        // --- Registration & Login ---
        .route("/ngo/register", post(handlers::register_ngo))
        .route("/donor/register", post(handlers::register_donor))
        // One credential check serves all three login pages.
        .route("/ngo/login", post(handlers::login))
        .route("/donor/login", post(handlers::login))
        .route("/admin/login", post(handlers::login))
        // --- Password Reset (NGO accounts) ---
        .route("/ngo/forgot-password", post(handlers::forgot_password))
        .route("/ngo/reset-password", post(handlers::reset_password))
        // --- Campaign Browsing ---
        .route("/campaigns", get(handlers::get_campaigns))
        .route("/campaigns/{id}", get(handlers::get_campaign))
        .route("/campaigns/{id}/updates", get(handlers::get_campaign_updates))
}
