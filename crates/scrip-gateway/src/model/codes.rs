use crate::error::AppError;
use jiff::Timestamp;
use scrip_core::{CodePage, CodeStatus, RedemptionCode};
use scrip_minter::{FieldPatch, MintRequest, QuotaMode};
use serde::{Deserialize, Serialize};

/// Wire request for minting a batch. Keeps the flat original shape:
/// `expired_time` is Unix seconds with `0` meaning "never expires",
/// and the quota fields are interpreted per `random_mode`.
#[derive(Debug, Deserialize)]
pub struct CreateCodesRequest {
    pub name: String,
    pub count: i64,
    #[serde(default)]
    pub quota: i64,
    #[serde(default)]
    pub expired_time: i64,
    #[serde(default)]
    pub random_mode: bool,
    #[serde(default)]
    pub min_quota: i64,
    #[serde(default)]
    pub max_quota: i64,
}

impl CreateCodesRequest {
    pub fn into_mint_request(self) -> Result<MintRequest, AppError> {
        let mode = if self.random_mode {
            QuotaMode::Random {
                min_quota: self.min_quota,
                max_quota: self.max_quota,
            }
        } else {
            QuotaMode::Fixed { quota: self.quota }
        };

        Ok(MintRequest::builder()
            .name(self.name)
            .count(self.count)
            .mode(mode)
            .expires_at(expires_at_from_wire(self.expired_time)?)
            .build())
    }
}

#[derive(Debug, Serialize)]
pub struct CreateCodesResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCodeRequest {
    pub name: String,
    pub quota: i64,
    #[serde(default)]
    pub expired_time: i64,
}

impl UpdateCodeRequest {
    pub fn into_field_patch(self) -> Result<FieldPatch, AppError> {
        Ok(FieldPatch {
            name: self.name,
            quota: self.quota,
            expires_at: expires_at_from_wire(self.expired_time)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: CodeStatus,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub key: String,
    pub status: CodeStatus,
    pub quota: i64,
    pub created_time: i64,
    pub expired_time: i64,
}

impl From<RedemptionCode> for CodeResponse {
    fn from(code: RedemptionCode) -> Self {
        Self {
            id: code.id,
            owner_id: code.owner_id,
            name: code.name,
            key: code.key,
            status: code.status,
            quota: code.quota,
            created_time: code.created_at.as_second(),
            expired_time: code.expires_at.map_or(0, |t| t.as_second()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub items: Vec<CodeResponse>,
    pub total: u64,
}

impl From<CodePage> for PageResponse {
    fn from(page: CodePage) -> Self {
        Self {
            items: page.items.into_iter().map(CodeResponse::from).collect(),
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub removed: u64,
}

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Page-numbered query, 1-based. Out-of-range values are clamped
/// rather than rejected.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub p: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl PageQuery {
    pub fn offset_limit(&self) -> (u64, u64) {
        let page = self.p.unwrap_or(1).max(1);
        let limit = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        ((page - 1) * limit, limit)
    }
}

// Not a flattened `PageQuery`: serde_urlencoded cannot drive flatten
// through non-string fields, so the page fields are repeated here.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    #[serde(default)]
    pub p: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl SearchQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            p: self.p,
            page_size: self.page_size,
        }
    }
}

fn expires_at_from_wire(expired_time: i64) -> Result<Option<Timestamp>, AppError> {
    if expired_time == 0 {
        return Ok(None);
    }
    Timestamp::from_second(expired_time)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("invalid expired_time '{expired_time}': {e}")))
}
