use crate::{
    AppState,
    auth::{self, ADMIN_SUBJECT, Identity, Role},
    error::{AppError, AppResult},
    models::{
        Campaign, CampaignListing, CampaignUpdate, CreateCampaignRequest, CreateDonationRequest,
        CreateUpdateRequest, Donation, ForgotPasswordRequest, ImageUploadRequest,
        ImageUploadResponse, LoginRequest, LoginResponse, MessageResponse, NewCampaign,
        NgoDashboard, PendingNgo, RegisterDonorRequest, RegisterNgoRequest, RegisterResponse,
        ResetPasswordRequest, ReviewNgoRequest, UpdateNgoProfileRequest, VerificationState,
        VerificationSubmission,
    },
    reset::CodeCheck,
    storage::{IMAGE_FOLDER, is_image_content_type},
    verification::{ReviewAction, VerificationStatus},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

// --- Guards & Validation ---

/// require_ngo
///
/// Handler-level role check behind the gate. Returns the NGO's account id.
fn require_ngo(identity: &Identity) -> AppResult<Uuid> {
    match (identity.role, identity.account_id()) {
        (Role::Ngo, Some(id)) => Ok(id),
        _ => Err(AppError::Forbidden("NGO account required")),
    }
}

fn require_donor(identity: &Identity) -> AppResult<Uuid> {
    match (identity.role, identity.account_id()) {
        (Role::Donor, Some(id)) => Ok(id),
        _ => Err(AppError::Forbidden("donor account required")),
    }
}

/// require_admin
///
/// Admin access is tied to the reserved address, exactly as in the gate.
fn require_admin(identity: &Identity, state: &AppState) -> AppResult<()> {
    if identity.is_admin(&state.config.admin_email) {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin access required"))
    }
}

/// non_empty
///
/// Trims and rejects blank strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn is_positive_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// ensure_email_available
///
/// An email may belong to one NGO or one donor, and never to the reserved admin.
async fn ensure_email_available(state: &AppState, email: &str) -> AppResult<()> {
    if email.eq_ignore_ascii_case(&state.config.admin_email) || state.repo.email_taken(email).await?
    {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }
    Ok(())
}

/// registration_error
///
/// A concurrent registration can still trip the unique index after the pre-check.
fn registration_error(e: sqlx::Error) -> AppError {
    let duplicate = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");
    if duplicate {
        AppError::BadRequest("Email already registered".to_string())
    } else {
        AppError::Database(e)
    }
}

// --- Session Handlers ---

/// register_ngo
///
/// [Public Route] Creates an NGO account. New NGOs start PENDING and cannot create
/// campaigns until an admin approves them.
#[utoipa::path(
    post,
    path = "/ngo/register",
    request_body = RegisterNgoRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register_ngo(
    State(state): State<AppState>,
    Json(payload): Json<RegisterNgoRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = payload.email.trim().to_string();
    validate_credentials(&email, &payload.password)?;

    let organization_name = non_empty(payload.organization_name).ok_or_else(|| {
        AppError::BadRequest("Organization name is required for NGO registration".to_string())
    })?;

    ensure_email_available(&state, &email).await?;

    let password_hash = auth::hash_password(&payload.password)?;
    let ngo = state
        .repo
        .create_ngo(&email, &password_hash, &organization_name)
        .await
        .map_err(registration_error)?;

    tracing::info!(ngo_id = %ngo.id, "NGO registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "NGO registered successfully".to_string(),
            id: ngo.id,
        }),
    ))
}

/// register_donor
///
/// [Public Route] Creates a donor account.
#[utoipa::path(
    post,
    path = "/donor/register",
    request_body = RegisterDonorRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register_donor(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDonorRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = payload.email.trim().to_string();
    validate_credentials(&email, &payload.password)?;

    let name = non_empty(payload.name).ok_or_else(|| {
        AppError::BadRequest("Name is required for donor registration".to_string())
    })?;

    ensure_email_available(&state, &email).await?;

    let password_hash = auth::hash_password(&payload.password)?;
    let donor = state
        .repo
        .create_donor(&email, &password_hash, &name)
        .await
        .map_err(registration_error)?;

    tracing::info!(donor_id = %donor.id, "donor registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Donor registered successfully".to_string(),
            id: donor.id,
        }),
    ))
}

/// login
///
/// [Public Route] Credential check shared by `/ngo/login`, `/donor/login` and
/// `/admin/login`. The reserved admin address is checked against the configured hash;
/// every other email is looked up among NGOs, then donors.
#[utoipa::path(
    post,
    path = "/ngo/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = payload.email.trim();

    if email == state.config.admin_email {
        let hash = &state.config.admin_password_hash;
        if hash.is_empty() || !auth::verify_password(&payload.password, hash) {
            tracing::warn!("failed admin login attempt");
            return Err(AppError::Unauthenticated);
        }
        let token = auth::issue_token(&state.config, ADMIN_SUBJECT, email, Role::Admin)?;
        return Ok(Json(LoginResponse {
            token,
            role: Role::Admin,
        }));
    }

    let Some(account) = state.repo.find_credentials(email).await? else {
        tracing::info!(email, "login for unknown account");
        return Err(AppError::Unauthenticated);
    };

    if !auth::verify_password(&payload.password, &account.password_hash) {
        tracing::info!(email, "login with wrong password");
        return Err(AppError::Unauthenticated);
    }

    let token = auth::issue_token(
        &state.config,
        &account.id.to_string(),
        &account.email,
        account.role,
    )?;

    Ok(Json(LoginResponse {
        token,
        role: account.role,
    }))
}

/// forgot_password
///
/// [Public Route] Issues a 6-digit reset code for an NGO account, valid 15 minutes.
#[utoipa::path(
    post,
    path = "/ngo/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Code issued", body = MessageResponse),
        (status = 404, description = "No NGO account with this email")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    match state.repo.find_credentials(email).await? {
        Some(account) if account.role == Role::Ngo => {}
        _ => return Err(AppError::NotFound("Account")),
    }

    let code = state.resets.issue(email);
    // TODO: send the code through the mail provider instead of the log.
    tracing::info!(email, code = %code, "password reset code issued");

    Ok(Json(MessageResponse::new(
        "Verification code sent to your email",
    )))
}

/// reset_password
///
/// [Public Route] Exchanges a valid reset code for a new password.
#[utoipa::path(
    post,
    path = "/ngo/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Missing, expired or wrong code")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = payload.email.trim();
    if email.is_empty() || payload.code.is_empty() || payload.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Email, code, and new password are required".to_string(),
        ));
    }

    match state.resets.check(email, payload.code.trim()) {
        CodeCheck::Valid => {}
        CodeCheck::Missing => {
            return Err(AppError::BadRequest(
                "Invalid or expired verification code".to_string(),
            ));
        }
        CodeCheck::Expired => {
            return Err(AppError::BadRequest(
                "Verification code has expired".to_string(),
            ));
        }
        CodeCheck::Mismatch => {
            return Err(AppError::BadRequest("Invalid verification code".to_string()));
        }
    }

    if payload.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = auth::hash_password(&payload.new_password)?;
    if !state.repo.update_ngo_password(email, &password_hash).await? {
        return Err(AppError::NotFound("Account"));
    }
    state.resets.consume(email);

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

// --- NGO Handlers ---

/// get_ngo_dashboard
///
/// [NGO Route] The NGO's profile and all of its campaigns.
#[utoipa::path(
    get,
    path = "/ngo/dashboard",
    responses((status = 200, description = "Dashboard", body = NgoDashboard))
)]
pub async fn get_ngo_dashboard(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<NgoDashboard>> {
    let ngo_id = require_ngo(&identity)?;
    let ngo = state
        .repo
        .get_ngo(ngo_id)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;
    let campaigns = state.repo.get_ngo_campaigns(ngo_id).await?;
    Ok(Json(NgoDashboard { ngo, campaigns }))
}

/// get_verification
///
/// [NGO Route] Current verification state. Reachable by unverified NGOs.
#[utoipa::path(
    get,
    path = "/ngo/verification",
    responses((status = 200, description = "Verification state", body = VerificationState))
)]
pub async fn get_verification(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<VerificationState>> {
    let ngo_id = require_ngo(&identity)?;
    let ngo = state
        .repo
        .get_ngo(ngo_id)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;
    Ok(Json(VerificationState {
        is_verified: ngo.is_verified,
        verification_status: ngo.verification_status,
    }))
}

/// submit_verification
///
/// [NGO Route] Stores verification details and puts the NGO back into PENDING,
/// whatever its previous state.
#[utoipa::path(
    post,
    path = "/ngo/verification",
    request_body = VerificationSubmission,
    responses(
        (status = 200, description = "Submitted", body = crate::models::Ngo),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn submit_verification(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<VerificationSubmission>,
) -> AppResult<Json<crate::models::Ngo>> {
    let ngo_id = require_ngo(&identity)?;

    let submission = VerificationSubmission {
        phone: non_empty(payload.phone),
        city: non_empty(payload.city),
        website: non_empty(payload.website),
        logo: non_empty(payload.logo),
    };
    if submission.phone.is_none() || submission.city.is_none() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let current = state
        .repo
        .get_ngo(ngo_id)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;
    let next = current.verification_status.resubmit();

    if current.verification_status == VerificationStatus::Verified {
        tracing::warn!(ngo_id = %ngo_id, "verified NGO resubmitted details, status reset to {}", next);
    }

    let updated = state
        .repo
        .submit_verification(ngo_id, submission, next)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;

    Ok(Json(updated))
}

/// update_ngo_profile
///
/// [NGO Route] Partial profile update. Does not change verification state.
#[utoipa::path(
    patch,
    path = "/ngo/profile",
    request_body = UpdateNgoProfileRequest,
    responses((status = 200, description = "Updated", body = crate::models::Ngo))
)]
pub async fn update_ngo_profile(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<UpdateNgoProfileRequest>,
) -> AppResult<Json<crate::models::Ngo>> {
    let ngo_id = require_ngo(&identity)?;
    let updated = state
        .repo
        .update_ngo_profile(ngo_id, payload)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;
    Ok(Json(updated))
}

/// get_ngo_campaigns
///
/// [NGO Route] Campaigns owned by the calling NGO, newest first.
#[utoipa::path(
    get,
    path = "/ngo/campaigns",
    responses((status = 200, description = "My campaigns", body = [Campaign]))
)]
pub async fn get_ngo_campaigns(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Campaign>>> {
    let ngo_id = require_ngo(&identity)?;
    Ok(Json(state.repo.get_ngo_campaigns(ngo_id).await?))
}

/// create_campaign
///
/// [NGO Route] Verified NGOs only. The gate already redirects unverified NGOs; the
/// check is repeated here for callers that bypass it.
#[utoipa::path(
    post,
    path = "/ngo/campaigns",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Created", body = Campaign),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "NGO not verified")
    )
)]
pub async fn create_campaign(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateCampaignRequest>,
) -> AppResult<(StatusCode, Json<Campaign>)> {
    let ngo_id = require_ngo(&identity)?;
    if !identity.is_verified {
        return Err(AppError::Forbidden("NGO is not verified"));
    }

    let missing = || AppError::BadRequest("Missing required fields".to_string());
    let campaign = NewCampaign {
        title: non_empty(payload.title).ok_or_else(missing)?,
        description: non_empty(payload.description).ok_or_else(missing)?,
        target_amount: payload.target_amount.ok_or_else(missing)?,
        deadline: payload.deadline.ok_or_else(missing)?,
        upi_id: non_empty(payload.upi_id).ok_or_else(missing)?,
        city: non_empty(payload.city).ok_or_else(missing)?,
    };
    if !is_positive_amount(campaign.target_amount) {
        return Err(AppError::BadRequest(
            "Target amount must be positive".to_string(),
        ));
    }

    let created = state.repo.create_campaign(ngo_id, campaign).await?;
    tracing::info!(campaign_id = %created.id, ngo_id = %ngo_id, "campaign created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// add_campaign_update
///
/// [NGO Route] Posts a progress update on one of the NGO's own campaigns.
#[utoipa::path(
    post,
    path = "/ngo/campaigns/{id}/updates",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = CreateUpdateRequest,
    responses(
        (status = 201, description = "Posted", body = CampaignUpdate),
        (status = 403, description = "Not the campaign owner"),
        (status = 404, description = "Campaign not found")
    )
)]
pub async fn add_campaign_update(
    identity: Identity,
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(payload): Json<CreateUpdateRequest>,
) -> AppResult<(StatusCode, Json<CampaignUpdate>)> {
    let ngo_id = require_ngo(&identity)?;

    let (Some(title), Some(description)) = (non_empty(payload.title), non_empty(payload.description))
    else {
        return Err(AppError::BadRequest(
            "Title and description are required".to_string(),
        ));
    };

    let campaign = state
        .repo
        .get_campaign(campaign_id)
        .await?
        .ok_or(AppError::NotFound("Campaign"))?;
    if campaign.ngo_id != ngo_id {
        return Err(AppError::Forbidden("not the campaign owner"));
    }

    let update = state
        .repo
        .add_campaign_update(campaign_id, &title, &description)
        .await?;
    Ok((StatusCode::CREATED, Json(update)))
}

// --- Admin Handlers ---

/// get_pending_ngos
///
/// [Admin Route] The review queue: NGOs in PENDING, newest first.
#[utoipa::path(
    get,
    path = "/admin/pending-ngos",
    responses((status = 200, description = "Pending NGOs", body = [PendingNgo]))
)]
pub async fn get_pending_ngos(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PendingNgo>>> {
    require_admin(&identity, &state)?;
    let pending = state.repo.get_pending_ngos().await?;
    tracing::debug!("found {} pending NGOs", pending.len());
    Ok(Json(pending))
}

/// verify_ngo
///
/// [Admin Route] Approves or rejects an NGO. The NGO is looked up first, so a
/// missing NGO is a 404 whatever the action; the action is parsed only once the
/// NGO exists.
#[utoipa::path(
    post,
    path = "/admin/verify-ngo",
    request_body = ReviewNgoRequest,
    responses(
        (status = 200, description = "Reviewed", body = crate::models::Ngo),
        (status = 400, description = "Missing fields or invalid action"),
        (status = 404, description = "NGO not found")
    )
)]
pub async fn verify_ngo(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<ReviewNgoRequest>,
) -> AppResult<Json<crate::models::Ngo>> {
    require_admin(&identity, &state)?;

    let (Some(ngo_id), Some(action)) = (payload.ngo_id, payload.action) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    let current = state
        .repo
        .get_ngo(ngo_id)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;
    let action: ReviewAction = action.parse()?;
    let next = current.verification_status.review(action);

    let updated = state
        .repo
        .set_verification_status(ngo_id, next)
        .await?
        .ok_or(AppError::NotFound("NGO"))?;

    tracing::info!(
        ngo_id = %ngo_id,
        from = %current.verification_status,
        to = %updated.verification_status,
        "NGO verification reviewed"
    );

    Ok(Json(updated))
}

// --- Public Campaign Handlers ---

/// get_campaigns
///
/// [Public Route] Active campaigns with the owning NGO's name and logo.
#[utoipa::path(
    get,
    path = "/campaigns",
    responses((status = 200, description = "Active campaigns", body = [CampaignListing]))
)]
pub async fn get_campaigns(State(state): State<AppState>) -> AppResult<Json<Vec<CampaignListing>>> {
    Ok(Json(state.repo.get_active_campaigns().await?))
}

/// get_campaign
#[utoipa::path(
    get,
    path = "/campaigns/{id}",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Found", body = Campaign),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Campaign>> {
    state
        .repo
        .get_campaign(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Campaign"))
}

/// get_campaign_updates
#[utoipa::path(
    get,
    path = "/campaigns/{id}/updates",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses((status = 200, description = "Updates", body = [CampaignUpdate]))
)]
pub async fn get_campaign_updates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<CampaignUpdate>>> {
    Ok(Json(state.repo.get_campaign_updates(id).await?))
}

// --- Authenticated Handlers ---

/// create_donation
///
/// [Authenticated Route] Records a donation from the calling donor and adds it to
/// the campaign total.
#[utoipa::path(
    post,
    path = "/donations",
    request_body = CreateDonationRequest,
    responses(
        (status = 201, description = "Recorded", body = Donation),
        (status = 400, description = "Missing fields or non-positive amount"),
        (status = 404, description = "Campaign not found")
    )
)]
pub async fn create_donation(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateDonationRequest>,
) -> AppResult<(StatusCode, Json<Donation>)> {
    let donor_id = require_donor(&identity)?;

    let (Some(campaign_id), Some(amount)) = (payload.campaign_id, payload.amount) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    if !is_positive_amount(amount) {
        return Err(AppError::BadRequest("Amount must be positive".to_string()));
    }

    let donation = state
        .repo
        .record_donation(donor_id, campaign_id, amount)
        .await?
        .ok_or(AppError::NotFound("Campaign"))?;

    Ok((StatusCode::CREATED, Json(donation)))
}

/// get_my_donations
#[utoipa::path(
    get,
    path = "/donor/donations",
    responses((status = 200, description = "My donations", body = [Donation]))
)]
pub async fn get_my_donations(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Donation>>> {
    let donor_id = require_donor(&identity)?;
    Ok(Json(state.repo.get_donor_donations(donor_id).await?))
}

/// get_image_upload_url
///
/// [Authenticated Route] Issues a 10-minute presigned PUT URL for an image. The
/// object key is server-generated; only the extension comes from the client.
#[utoipa::path(
    post,
    path = "/uploads/image",
    request_body = ImageUploadRequest,
    responses(
        (status = 200, description = "URL", body = ImageUploadResponse),
        (status = 400, description = "Not an image content type")
    )
)]
pub async fn get_image_upload_url(
    _identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<ImageUploadRequest>,
) -> AppResult<Json<ImageUploadResponse>> {
    if !is_image_content_type(&payload.file_type) {
        return Err(AppError::BadRequest(
            "Only image uploads are supported".to_string(),
        ));
    }

    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");
    let object_key = format!("{}/{}.{}", IMAGE_FOLDER, Uuid::new_v4(), extension);

    let upload_url = state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(ImageUploadResponse {
        upload_url,
        resource_key: object_key,
    }))
}
