use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// The verification review surface. The access gate redirects anyone but the
/// reserved admin address to `/admin/login`, and each handler repeats the check.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/pending-ngos
        // The review queue.
        .route("/admin/pending-ngos", get(handlers::get_pending_ngos))
        // POST /admin/verify-ngo
        // `{ngoId, action}` with action "approve" or "reject".
        .route("/admin/verify-ngo", post(handlers::verify_ngo))
}
