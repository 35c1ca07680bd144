use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rand::Rng;

/// Reset codes are valid for 15 minutes.
pub const RESET_CODE_TTL: Duration = Duration::from_secs(15 * 60);

struct ResetCode {
    code: String,
    expires_at: Instant,
}

/// CodeCheck
///
/// Outcome of checking a submitted reset code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    Missing,
    Expired,
    Mismatch,
}

/// ResetCodeStore
///
/// In-process store of one outstanding password-reset code per email. Issuing a new
/// code replaces the previous one. Codes do not survive a restart.
pub struct ResetCodeStore {
    codes: DashMap<String, ResetCode>,
    ttl: Duration,
}

impl Default for ResetCodeStore {
    fn default() -> Self {
        Self::with_ttl(RESET_CODE_TTL)
    }
}

impl ResetCodeStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            codes: DashMap::new(),
            ttl,
        }
    }

    /// Generates and stores a fresh 6-digit code for `email`.
    pub fn issue(&self, email: &str) -> String {
        let code = rand::thread_rng().gen_range(100_000..1_000_000).to_string();
        self.codes.insert(
            email.to_string(),
            ResetCode {
                code: code.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        code
    }

    /// Checks a submitted code. An expired code is removed as a side effect; a valid
    /// code stays until `consume` so a failed password write can be retried.
    pub fn check(&self, email: &str, code: &str) -> CodeCheck {
        let outcome = match self.codes.get(email) {
            None => return CodeCheck::Missing,
            Some(stored) if stored.expires_at <= Instant::now() => CodeCheck::Expired,
            Some(stored) if stored.code != code => CodeCheck::Mismatch,
            Some(_) => CodeCheck::Valid,
        };

        if outcome == CodeCheck::Expired {
            self.codes.remove(email);
        }
        outcome
    }

    pub fn consume(&self, email: &str) {
        self.codes.remove(email);
    }
}

pub type ResetCodeState = Arc<ResetCodeStore>;
