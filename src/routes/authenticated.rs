use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes outside the gate's scope that still need a session. Each handler takes an
/// `Identity` argument, which rejects with 401 when no valid session is present, and
/// checks the role it needs itself.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // POST /donations
        // Donors only. The donor is taken from the session, not the body.
        .route("/donations", post(handlers::create_donation))
        // GET /donor/donations
        .route("/donor/donations", get(handlers::get_my_donations))
        // POST /uploads/image
        // Presigned upload URL for logos and campaign images.
        .route("/uploads/image", post(handlers::get_image_upload_url))
}
