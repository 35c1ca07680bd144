use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{auth::Role, verification::VerificationStatus};

// --- Core Application Schemas (Mapped to Database) ---

/// Ngo
///
/// An NGO account from the `ngos` table. The password hash is only ever read
/// through `AccountCredentials`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ngo {
    pub id: Uuid,
    pub email: String,
    pub organization_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub donation_needed: Option<f64>,
    pub purpose: Option<String>,
    pub impact: Option<String>,
    // Always equal to `verification_status == VERIFIED`.
    pub is_verified: bool,
    pub verification_status: VerificationStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Donor
///
/// A donor account from the `donors` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// AccountCredentials
///
/// Internal record used by login and password reset. Never serialized.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Campaign
///
/// A fundraising campaign owned by a verified NGO.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub title: String,
    pub description: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[ts(type = "string")]
    pub deadline: DateTime<Utc>,
    pub upi_id: String,
    pub city: String,
    // "active" for every campaign this service creates.
    pub status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CampaignListing
///
/// Public listing row: a campaign joined with the owning NGO's display fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListing {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub title: String,
    pub description: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[ts(type = "string")]
    pub deadline: DateTime<Utc>,
    pub upi_id: String,
    pub city: String,
    pub status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub organization_name: String,
    pub ngo_logo: Option<String>,
}

/// Donation
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub donor_id: Uuid,
    pub amount: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CampaignUpdate
///
/// A progress post attached to a campaign (`campaign_updates` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub title: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// PendingNgo
///
/// Admin review queue row.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingNgo {
    pub id: Uuid,
    pub organization_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub purpose: Option<String>,
    pub impact: Option<String>,
    pub verification_status: VerificationStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterNgoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNgoRequest {
    pub email: String,
    pub password: String,
    pub organization_name: Option<String>,
}

/// RegisterDonorRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDonorRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// RegisterResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterResponse {
    pub message: String,
    pub id: Uuid,
}

/// LoginRequest
///
/// Shared by the NGO, donor and admin login routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// The session token to be sent back as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// VerificationSubmission
///
/// Verification details posted by an NGO. Every submission sends the NGO back to
/// PENDING.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSubmission {
    pub phone: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

/// VerificationState
///
/// Current verification view returned to the NGO.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VerificationState {
    pub is_verified: bool,
    pub verification_status: VerificationStatus,
}

/// ReviewNgoRequest
///
/// Admin review payload. `action` stays a raw string so unknown values are reported
/// as a 400 by the handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNgoRequest {
    pub ngo_id: Option<Uuid>,
    pub action: Option<String>,
}

/// UpdateNgoProfileRequest
///
/// Partial profile update. `None` leaves a column unchanged. Verification state is
/// not touched by profile edits.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNgoProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_needed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// CreateCampaignRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub upi_id: Option<String>,
    pub city: Option<String>,
}

/// NewCampaign
///
/// A validated `CreateCampaignRequest`, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub target_amount: f64,
    pub deadline: DateTime<Utc>,
    pub upi_id: String,
    pub city: String,
}

/// CreateDonationRequest
///
/// The donor is taken from the session, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    pub campaign_id: Option<Uuid>,
    pub amount: Option<f64>,
}

/// CreateUpdateRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// ImageUploadRequest
///
/// Input payload for requesting a short-lived upload URL for a logo or campaign image.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadRequest {
    #[schema(example = "logo.png")]
    pub filename: String,
    #[schema(example = "image/png")]
    pub file_type: String,
}

/// ImageUploadResponse
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub upload_url: String,
    pub resource_key: String,
}

/// ForgotPasswordRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// ResetPasswordRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// MessageResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// --- Dashboard Schemas (Output) ---

/// NgoDashboard
///
/// Output schema for `GET /ngo/dashboard`: the NGO's profile and its campaigns.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NgoDashboard {
    pub ngo: Ngo,
    pub campaigns: Vec<Campaign>,
}
