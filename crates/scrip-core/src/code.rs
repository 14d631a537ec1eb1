use crate::error::CoreError;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a redemption code.
///
/// The integer representation is the wire and database format; `Unused`
/// codes are redeemable, `Used` and `Disabled` codes are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum CodeStatus {
    Unused = 1,
    Disabled = 2,
    Used = 3,
}

impl CodeStatus {
    /// Whether the status marks the code as consumed or shut off,
    /// making it eligible for invalid-record cleanup.
    pub fn is_spent(self) -> bool {
        matches!(self, CodeStatus::Used | CodeStatus::Disabled)
    }
}

impl From<CodeStatus> for i32 {
    fn from(status: CodeStatus) -> Self {
        status as i32
    }
}

impl TryFrom<i32> for CodeStatus {
    type Error = CoreError;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(CodeStatus::Unused),
            2 => Ok(CodeStatus::Disabled),
            3 => Ok(CodeStatus::Used),
            other => Err(CoreError::InvalidStatus(other)),
        }
    }
}

/// A single-use redemption code granting a quota to the redeeming account.
///
/// Codes are only ever created in batches; all codes of one batch share
/// `name`, `owner_id`, `created_at` and `expires_at`, while `key` and
/// (in random mode) `quota` are per-code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionCode {
    /// Assigned by the repository on insert; 0 until then, immutable after.
    pub id: i64,
    /// Identifier of the creating principal.
    pub owner_id: i64,
    /// Human-readable label, 1-20 characters.
    pub name: String,
    /// The redemption credential itself; globally unique.
    pub key: String,
    pub status: CodeStatus,
    /// Quota granted on redemption; always positive.
    pub quota: i64,
    pub created_at: Timestamp,
    /// `None` means the code never expires.
    pub expires_at: Option<Timestamp>,
}

impl RedemptionCode {
    /// Whether the code's expiration has passed at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Whether the code is eligible for invalid-record cleanup at `now`:
    /// already consumed or disabled, or past its expiration.
    pub fn is_invalid(&self, now: Timestamp) -> bool {
        self.status.is_spent() || self.is_expired(now)
    }
}
