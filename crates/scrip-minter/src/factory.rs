use jiff::Timestamp;
use scrip_core::{CodeStatus, KeyGenerator, RedemptionCode};

/// The outcome of materializing one batch: the records to persist and,
/// in the same order, the keys handed back to the caller. Administrators
/// receive the redeemable keys, not database identifiers.
#[derive(Debug, Clone)]
pub struct MintedBatch {
    pub codes: Vec<RedemptionCode>,
    pub keys: Vec<String>,
}

/// Materializes redemption records from a validated request and an
/// allocated quota sequence.
#[derive(Debug, Clone)]
pub struct CodeFactory<K> {
    keygen: K,
}

impl<K: KeyGenerator> CodeFactory<K> {
    pub fn new(keygen: K) -> Self {
        Self { keygen }
    }

    /// Builds one record per quota value.
    ///
    /// `minted_at` is captured once per batch by the caller, so every
    /// record of the batch carries the same creation time. Ids are left
    /// at 0 for the repository to assign.
    pub fn mint(
        &self,
        owner_id: i64,
        name: &str,
        expires_at: Option<Timestamp>,
        quotas: &[i64],
        minted_at: Timestamp,
    ) -> MintedBatch {
        let mut codes = Vec::with_capacity(quotas.len());
        let mut keys = Vec::with_capacity(quotas.len());

        for &quota in quotas {
            let key = self.keygen.generate();
            codes.push(RedemptionCode {
                id: 0,
                owner_id,
                name: name.to_string(),
                key: key.clone(),
                status: CodeStatus::Unused,
                quota,
                created_at: minted_at,
                expires_at,
            });
            keys.push(key);
        }

        MintedBatch { codes, keys }
    }
}
