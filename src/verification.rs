use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::AppError;

/// VerificationStatus
///
/// The NGO verification lifecycle. Every NGO starts in `Pending` and returns to it on
/// each resubmission of verification details. Only the admin review moves it to
/// `Verified` or `Rejected`.
///
/// Stored as the Postgres enum `verification_status` (see the initial migration).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
    sqlx::Type,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "verification_status", rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    /// The `is_verified` flag paired with this status. The two columns are always
    /// written together from this mapping.
    pub fn is_verified(self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }

    /// Applies an admin review. Review is allowed from any state and is idempotent:
    /// rejecting a rejected NGO leaves it rejected.
    pub fn review(self, action: ReviewAction) -> VerificationStatus {
        match action {
            ReviewAction::Approve => VerificationStatus::Verified,
            ReviewAction::Reject => VerificationStatus::Rejected,
        }
    }

    /// Applies a resubmission of verification details by the NGO itself.
    ///
    /// Always lands in `Pending`, including from `Verified`, which revokes campaign
    /// creation until an admin reviews the new details.
    pub fn resubmit(self) -> VerificationStatus {
        VerificationStatus::Pending
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// ReviewAction
///
/// The two actions the admin review endpoint accepts. Parsed from the raw request
/// string so that an unknown value is a 400 rather than a body-deserialization
/// rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl FromStr for ReviewAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(AppError::BadRequest("Invalid action".to_string())),
        }
    }
}
