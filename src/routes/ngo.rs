use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// NGO Router Module
///
/// Everything under `/ngo` except the public auth routes. The access gate runs in
/// front of these: non-NGOs are sent home, and unverified NGOs are sent to
/// `/ngo/verification` from every other route.
pub fn ngo_routes() -> Router<AppState> {
    Router::new()
        .route("/ngo/dashboard", get(handlers::get_ngo_dashboard))
        // GET/POST /ngo/verification
        // The only NGO route an unverified NGO may reach. Posting details resets
        // the NGO to PENDING.
        .route(
            "/ngo/verification",
            get(handlers::get_verification).post(handlers::submit_verification),
        )
        .route("/ngo/profile", patch(handlers::update_ngo_profile))
        // GET/POST /ngo/campaigns
        // Campaign creation is the capability verification gates.
        .route(
            "/ngo/campaigns",
            get(handlers::get_ngo_campaigns).post(handlers::create_campaign),
        )
        .route(
            "/ngo/campaigns/{id}/updates",
            post(handlers::add_campaign_update),
        )
}
