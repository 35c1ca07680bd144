use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Donor, Ngo},
    repository::RepositoryState,
    verification::VerificationStatus,
};

/// Subject id carried by the admin's session token. The admin is not a stored account.
pub const ADMIN_SUBJECT: &str = "admin";

/// Role
///
/// Fixed at account creation. NGO and donor accounts live in separate tables; the
/// admin is the reserved configured address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Ngo,
    Donor,
}

/// Claims
///
/// Payload of the session token issued at login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The account UUID, or `ADMIN_SUBJECT` for the reserved admin.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Identity
///
/// The per-request snapshot the access gate and handlers read. It is re-derived from
/// the session token and the record store on every request, so a verification
/// decision made by the admin takes effect on the NGO's very next request.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    /// Present for NGOs only.
    pub verification_status: Option<VerificationStatus>,
}

impl Identity {
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            subject_id: ADMIN_SUBJECT.to_string(),
            email: email.into(),
            role: Role::Admin,
            is_verified: false,
            verification_status: None,
        }
    }

    pub fn from_ngo(ngo: &Ngo) -> Self {
        Self {
            subject_id: ngo.id.to_string(),
            email: ngo.email.clone(),
            role: Role::Ngo,
            is_verified: ngo.verification_status.is_verified(),
            verification_status: Some(ngo.verification_status),
        }
    }

    pub fn from_donor(donor: &Donor) -> Self {
        Self {
            subject_id: donor.id.to_string(),
            email: donor.email.clone(),
            role: Role::Donor,
            is_verified: false,
            verification_status: None,
        }
    }

    /// The account id for NGO and donor identities. `None` for the admin.
    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.subject_id).ok()
    }

    pub fn is_admin(&self, admin_email: &str) -> bool {
        self.email == admin_email
    }
}

// --- Credentials ---

/// hash_password
///
/// bcrypt with the library's default cost.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AppError::Internal(e.to_string()))
}

/// verify_password
///
/// A malformed stored hash is treated as a failed match rather than an error, so it
/// surfaces to the caller as an ordinary login failure.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// --- Session Tokens ---

fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// issue_token
///
/// Signs an HS256 session token valid for `config.session_ttl_secs`.
pub fn issue_token(
    config: &AppConfig,
    subject: &str,
    email: &str,
    role: Role,
) -> Result<String, AppError> {
    let iat = now_secs();
    let claims = Claims {
        sub: subject.to_string(),
        email: email.to_string(),
        role,
        iat,
        exp: iat.saturating_add(usize::try_from(config.session_ttl_secs).unwrap_or(usize::MAX)),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// decode_token
///
/// Validates signature and expiry. Any failure is `Unauthenticated`.
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("rejected session token: {:?}", e.kind());
        AppError::Unauthenticated
    })
}

// --- Identity Resolution ---

/// lookup_account
///
/// Loads the current NGO or donor record for an account id. NGOs are tried first,
/// as at login.
async fn lookup_account(repo: &RepositoryState, id: Uuid) -> Result<Option<Identity>, AppError> {
    if let Some(ngo) = repo.get_ngo(id).await? {
        return Ok(Some(Identity::from_ngo(&ngo)));
    }
    Ok(repo.get_donor(id).await?.map(|d| Identity::from_donor(&d)))
}

/// resolve_identity
///
/// Derives the caller's Identity from request headers.
///
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing account.
/// 2. Bearer token: decoded and validated, then
///    - the admin subject is accepted only for the configured admin address;
///    - NGO and donor subjects are re-read from the store, so verification flags are
///      current and deleted accounts lose access.
///
/// `Ok(None)` means "no valid session"; `Err` is reserved for store failures.
pub async fn resolve_identity(
    parts: &Parts,
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<Option<Identity>, AppError> {
    if config.env == Env::Local {
        let bypass_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());

        if let Some(id) = bypass_id {
            if let Some(identity) = lookup_account(repo, id).await? {
                return Ok(Some(identity));
            }
        }
    }

    let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return Ok(None);
    };

    let claims = match decode_token(config, token) {
        Ok(claims) => claims,
        Err(_) => return Ok(None),
    };

    match claims.role {
        Role::Admin => {
            if claims.sub == ADMIN_SUBJECT && claims.email == config.admin_email {
                Ok(Some(Identity::admin(claims.email)))
            } else {
                Ok(None)
            }
        }
        Role::Ngo | Role::Donor => {
            let Ok(id) = Uuid::parse_str(&claims.sub) else {
                return Ok(None);
            };
            let identity = lookup_account(repo, id).await?;
            // The stored role must match what the token claims.
            Ok(identity.filter(|i| i.role == claims.role))
        }
    }
}

/// Identity Extractor Implementation
///
/// Makes `Identity` usable as a handler argument. Rejects with `Unauthenticated`
/// when no valid session is present.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The gate middleware may already have resolved the identity for this request.
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        resolve_identity(parts, &repo, &config)
            .await?
            .ok_or(AppError::Unauthenticated)
    }
}
