use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod reset;
pub mod storage;
pub mod verification;

pub mod routes;
use routes::{admin, authenticated, ngo, public};

// --- Public Re-exports ---

pub use auth::Identity;
pub use config::AppConfig;
pub use error::AppError;
pub use gate::{AccessGate, GateDecision, RouteTable};
pub use repository::{PostgresRepository, RepositoryState};
pub use reset::{ResetCodeState, ResetCodeStore};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every handler and schema, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_ngo, handlers::register_donor, handlers::login,
        handlers::forgot_password, handlers::reset_password,
        handlers::get_ngo_dashboard, handlers::get_verification, handlers::submit_verification,
        handlers::update_ngo_profile, handlers::get_ngo_campaigns, handlers::create_campaign,
        handlers::add_campaign_update, handlers::get_pending_ngos, handlers::verify_ngo,
        handlers::get_campaigns, handlers::get_campaign, handlers::get_campaign_updates,
        handlers::create_donation, handlers::get_my_donations, handlers::get_image_upload_url
    ),
    components(
        schemas(
            models::Ngo, models::Donor, models::Campaign, models::CampaignListing,
            models::Donation, models::CampaignUpdate, models::PendingNgo,
            models::RegisterNgoRequest, models::RegisterDonorRequest, models::RegisterResponse,
            models::LoginRequest, models::LoginResponse, models::VerificationSubmission,
            models::VerificationState, models::ReviewNgoRequest, models::UpdateNgoProfileRequest,
            models::CreateCampaignRequest, models::CreateDonationRequest,
            models::CreateUpdateRequest, models::ImageUploadRequest, models::ImageUploadResponse,
            models::ForgotPasswordRequest, models::ResetPasswordRequest, models::MessageResponse,
            models::NgoDashboard, auth::Role, verification::VerificationStatus,
        )
    ),
    tags(
        (name = "changify", description = "Changify crowdfunding API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container for services and configuration, cloned into every
/// request.
#[derive(Clone)]
pub struct AppState {
    /// Record store.
    pub repo: RepositoryState,
    /// Image hosting.
    pub storage: StorageState,
    /// Immutable configuration loaded at startup.
    pub config: AppConfig,
    /// The access gate, built once from the route table and the admin address.
    pub gate: Arc<AccessGate>,
    /// Outstanding password-reset codes.
    pub resets: ResetCodeState,
}

impl AppState {
    pub fn new(repo: RepositoryState, storage: StorageState, config: AppConfig) -> Self {
        let gate = AccessGate::new(RouteTable::default(), config.admin_email.clone());
        Self {
            repo,
            storage,
            config,
            gate: Arc::new(gate),
            resets: Arc::new(ResetCodeStore::default()),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_gate
///
/// Middleware in front of the whole router. Requests outside the admin and NGO
/// prefixes pass straight through, and so do the public routes inside them: no
/// identity is resolved for those, so a store failure cannot turn a login or
/// password reset into a 500. For the remaining guarded paths the caller's identity
/// is resolved once, the gate decides, and the decision becomes the response:
///
/// - `Allow`: the identity is stashed in request extensions so the handler's
///   `Identity` extractor does not resolve it a second time.
/// - `RedirectTo`: `307 Temporary Redirect` to the target.
/// - `Unauthorized`: `401` with the standard JSON error body.
async fn access_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let routes = state.gate.routes();
    if !routes.guards(&path) || routes.is_public(&path) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let identity = match auth::resolve_identity(&parts, &state.repo, &state.config).await {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    match state.gate.evaluate(identity.as_ref(), &path) {
        GateDecision::Allow => {
            if let Some(identity) = identity {
                parts.extensions.insert(identity);
            }
            next.run(Request::from_parts(parts, body)).await
        }
        GateDecision::RedirectTo(target) => {
            tracing::info!(
                email = identity.as_ref().map(|i| i.email.as_str()).unwrap_or("-"),
                path = %path,
                target = %target,
                "access gate redirect"
            );
            Redirect::temporary(&target).into_response()
        }
        GateDecision::Unauthorized => {
            tracing::warn!(path = %path, "unauthenticated request to guarded route");
            AppError::Unauthenticated.into_response()
        }
    }
}

/// create_router
///
/// Assembles the routing structure, the access gate and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .merge(ngo::ngo_routes())
        .merge(admin::admin_routes())
        // Applied with `layer` rather than `route_layer` so unknown paths under a
        // guarded prefix are still gated, not answered with a bare 404.
        .layer(middleware::from_fn_with_state(state.clone(), access_gate))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for each request carrying method, uri and the `x-request-id`, so every log
/// line for one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
