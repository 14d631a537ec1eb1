use crate::code::RedemptionCode;
use crate::error::Result;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One page of codes plus the total match count across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodePage {
    pub items: Vec<RedemptionCode>,
    pub total: u64,
}

/// Persistence contract for redemption codes.
///
/// Implementations own the invalid-record criteria of [`delete_invalid`]
/// and the chunking strategy of [`create_batch`]; callers only see an
/// all-or-nothing outcome per call.
///
/// [`delete_invalid`]: Repository::delete_invalid
/// [`create_batch`]: Repository::create_batch
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Persists a freshly minted batch. Ids are assigned by the store.
    /// Returns `Err(Conflict)` if any key already exists; in that case
    /// no code of the batch is visible afterwards.
    async fn create_batch(&self, codes: &[RedemptionCode]) -> Result<()>;

    /// Retrieves a code by its id. Returns `None` if absent.
    async fn get_by_id(&self, id: i64) -> Result<Option<RedemptionCode>>;

    /// Keyword search over id (exact, when the keyword is numeric),
    /// name (substring) and key (exact), newest first.
    async fn search(&self, keyword: &str, offset: u64, limit: u64) -> Result<CodePage>;

    /// Lists codes newest first.
    async fn list(&self, offset: u64, limit: u64) -> Result<CodePage>;

    /// Replaces the stored row for `code.id`.
    /// Returns `true` if a row existed and was updated.
    async fn update(&self, code: &RedemptionCode) -> Result<bool>;

    /// Deletes a single code. Returns `true` if it existed.
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Bulk-deletes codes that are used, disabled, or expired at `now`.
    /// Returns the number of rows removed.
    async fn delete_invalid(&self, now: Timestamp) -> Result<u64>;
}
