use crate::error::{MintError, Result};
use crate::factory::{CodeFactory, MintedBatch};
use crate::quota::QuotaAllocator;
use crate::validate::{validate_expiration, validate_mint_request, MintRequest};
use async_trait::async_trait;
use jiff::Timestamp;
use rand::rngs::StdRng;
use rand::Rng;
use scrip_core::{
    Clock, CodePage, CodeStatus, KeyGenerator, RedemptionCode, Repository, SystemClock,
    UuidKeyGenerator,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Replacement values for an administrative full-field update.
///
/// Deliberately a separate type from [`MintRequest`]: updates touch one
/// existing record and never change its key, owner or status.
#[derive(Debug, Clone)]
pub struct FieldPatch {
    pub name: String,
    pub quota: i64,
    pub expires_at: Option<Timestamp>,
}

/// The operations the admin transport layer binds to.
///
/// Every error is scoped to its request; nothing here is fatal to the
/// process.
#[async_trait]
pub trait Minter: Send + Sync + 'static {
    /// Validates the request, mints `count` codes and persists them in
    /// one repository call. Returns the ordered redeemable keys.
    async fn mint(&self, owner_id: i64, request: MintRequest) -> Result<Vec<String>>;

    /// Point lookup; `NotFound` if the id does not exist.
    async fn get(&self, id: i64) -> Result<RedemptionCode>;

    /// Keyword search, newest first.
    async fn search(&self, keyword: &str, offset: u64, limit: u64) -> Result<CodePage>;

    /// Paginated listing, newest first.
    async fn list(&self, offset: u64, limit: u64) -> Result<CodePage>;

    /// Replaces `name`, `quota` and `expires_at` on an existing record.
    /// Re-runs the expiration check; leaves `status` untouched.
    async fn update_fields(&self, id: i64, patch: FieldPatch) -> Result<RedemptionCode>;

    /// Replaces only `status`. Administrative override: any target state
    /// is allowed, no other validation runs.
    async fn update_status(&self, id: i64, status: CodeStatus) -> Result<RedemptionCode>;

    /// Removes a single code.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Bulk-removes used, disabled and expired codes.
    /// Returns the number of rows removed.
    async fn purge_invalid(&self) -> Result<u64>;
}

/// A concrete implementation of the [`Minter`] trait.
///
/// Composes the validator, the quota allocator and the code factory in
/// front of a `Repository`. The clock, key generator and random source
/// are injected so every temporal and random decision is testable.
#[derive(Debug)]
pub struct MinterService<R, K, C = SystemClock, N = StdRng> {
    repository: Arc<R>,
    factory: CodeFactory<K>,
    allocator: QuotaAllocator<N>,
    clock: C,
}

impl<R: Repository> MinterService<R, UuidKeyGenerator> {
    /// Service with the production collaborators: UUID keys, wall clock,
    /// OS-entropy randomness.
    pub fn new(repository: R) -> Self {
        Self::with_parts(
            repository,
            UuidKeyGenerator,
            SystemClock,
            QuotaAllocator::from_os_rng(),
        )
    }
}

impl<R, K, C, N> MinterService<R, K, C, N>
where
    R: Repository,
    K: KeyGenerator,
    C: Clock,
    N: Rng + Send + 'static,
{
    pub fn with_parts(repository: R, keygen: K, clock: C, allocator: QuotaAllocator<N>) -> Self {
        Self {
            repository: Arc::new(repository),
            factory: CodeFactory::new(keygen),
            allocator,
            clock,
        }
    }

    async fn load(&self, id: i64) -> Result<RedemptionCode> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(MintError::NotFound(id))
    }

    async fn store(&self, code: &RedemptionCode) -> Result<()> {
        if !self.repository.update(code).await? {
            return Err(MintError::NotFound(code.id));
        }
        Ok(())
    }
}

#[async_trait]
impl<R, K, C, N> Minter for MinterService<R, K, C, N>
where
    R: Repository,
    K: KeyGenerator,
    C: Clock,
    N: Rng + Send + 'static,
{
    async fn mint(&self, owner_id: i64, request: MintRequest) -> Result<Vec<String>> {
        validate_mint_request(&request, self.clock.now())?;

        let quotas = self.allocator.allocate(request.mode, request.count as usize);

        // One timestamp per batch, so the group is temporally coherent.
        let minted_at = self.clock.now();
        let MintedBatch { codes, keys } =
            self.factory
                .mint(owner_id, &request.name, request.expires_at, &quotas, minted_at);

        self.repository.create_batch(&codes).await?;

        info!(
            owner_id,
            count = keys.len(),
            name = %request.name,
            "minted redemption batch"
        );
        Ok(keys)
    }

    async fn get(&self, id: i64) -> Result<RedemptionCode> {
        self.load(id).await
    }

    async fn search(&self, keyword: &str, offset: u64, limit: u64) -> Result<CodePage> {
        Ok(self.repository.search(keyword, offset, limit).await?)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<CodePage> {
        Ok(self.repository.list(offset, limit).await?)
    }

    async fn update_fields(&self, id: i64, patch: FieldPatch) -> Result<RedemptionCode> {
        let mut code = self.load(id).await?;

        validate_expiration(patch.expires_at, self.clock.now())?;

        code.name = patch.name;
        code.quota = patch.quota;
        code.expires_at = patch.expires_at;

        self.store(&code).await?;
        Ok(code)
    }

    async fn update_status(&self, id: i64, status: CodeStatus) -> Result<RedemptionCode> {
        let mut code = self.load(id).await?;
        code.status = status;

        self.store(&code).await?;
        Ok(code)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        if !self.repository.delete_by_id(id).await? {
            return Err(MintError::NotFound(id));
        }
        Ok(())
    }

    async fn purge_invalid(&self) -> Result<u64> {
        let removed = self.repository.delete_invalid(self.clock.now()).await?;
        debug!(removed, "purged invalid redemption codes");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::validate::QuotaMode;
    use rand::SeedableRng;
    use scrip_core::{FixedClock, SequentialKeyGenerator};
    use scrip_storage::InMemoryRepository;
    use std::collections::HashSet;

    type TestService = MinterService<InMemoryRepository, SequentialKeyGenerator, FixedClock>;

    fn base_time() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn test_service() -> (TestService, FixedClock) {
        let clock = FixedClock::new(base_time());
        let service = MinterService::with_parts(
            InMemoryRepository::new(),
            SequentialKeyGenerator::with_prefix("sk"),
            clock.clone(),
            QuotaAllocator::new(StdRng::seed_from_u64(42)),
        );
        (service, clock)
    }

    fn fixed(name: &str, count: i64, quota: i64) -> MintRequest {
        MintRequest::builder()
            .name(name)
            .count(count)
            .mode(QuotaMode::Fixed { quota })
            .build()
    }

    #[tokio::test]
    async fn fixed_mode_mints_n_codes_with_the_requested_quota() {
        let (service, _) = test_service();

        let keys = service.mint(7, fixed("promo", 3, 100)).await.unwrap();

        assert_eq!(keys, vec!["sk000000", "sk000001", "sk000002"]);

        let page = service.list(0, 10).await.unwrap();
        assert_eq!(page.total, 3);
        for code in &page.items {
            assert_eq!(code.quota, 100);
            assert_eq!(code.owner_id, 7);
            assert_eq!(code.name, "promo");
            assert_eq!(code.status, CodeStatus::Unused);
            assert_eq!(code.created_at, base_time());
            assert_eq!(code.expires_at, None);
            assert_ne!(code.id, 0);
        }
    }

    #[tokio::test]
    async fn random_mode_mints_quotas_within_bounds() {
        let (service, _) = test_service();

        let request = MintRequest::builder()
            .name("promo")
            .count(5)
            .mode(QuotaMode::Random {
                min_quota: 10,
                max_quota: 20,
            })
            .build();
        let keys = service.mint(7, request).await.unwrap();

        assert_eq!(keys.len(), 5);
        assert_eq!(keys.iter().collect::<HashSet<_>>().len(), 5);

        let page = service.list(0, 10).await.unwrap();
        assert_eq!(page.total, 5);
        assert!(page.items.iter().all(|c| (10..=20).contains(&c.quota)));
    }

    #[tokio::test]
    async fn invalid_name_persists_nothing() {
        let (service, _) = test_service();

        let err = service.mint(7, fixed("", 1, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            MintError::Validation(ValidationError::InvalidName(0))
        ));

        let page = service.list(0, 10).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn expired_request_is_rejected_against_the_injected_clock() {
        let (service, clock) = test_service();

        let past = clock.now() - jiff::SignedDuration::from_secs(1);
        let request = MintRequest::builder()
            .name("promo")
            .count(1)
            .mode(QuotaMode::Fixed { quota: 1 })
            .expires_at(Some(past))
            .build();

        let err = service.mint(7, request).await.unwrap_err();
        assert!(matches!(
            err,
            MintError::Validation(ValidationError::ExpiredInPast { .. })
        ));
    }

    #[tokio::test]
    async fn get_returns_the_minted_code_and_not_found_otherwise() {
        let (service, _) = test_service();

        service.mint(7, fixed("promo", 1, 50)).await.unwrap();
        let page = service.list(0, 1).await.unwrap();
        let id = page.items[0].id;

        let code = service.get(id).await.unwrap();
        assert_eq!(code.quota, 50);

        let err = service.get(id + 999).await.unwrap_err();
        assert!(matches!(err, MintError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_fields_replaces_fields_and_keeps_status() {
        let (service, _) = test_service();

        service.mint(7, fixed("promo", 1, 50)).await.unwrap();
        let id = service.list(0, 1).await.unwrap().items[0].id;
        service.update_status(id, CodeStatus::Disabled).await.unwrap();

        let future = base_time() + jiff::SignedDuration::from_secs(1_000);
        let updated = service
            .update_fields(
                id,
                FieldPatch {
                    name: "renamed".to_string(),
                    quota: 75,
                    expires_at: Some(future),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.quota, 75);
        assert_eq!(updated.expires_at, Some(future));
        // The full update never touches status.
        assert_eq!(updated.status, CodeStatus::Disabled);

        let stored = service.get(id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn update_fields_reruns_the_expiration_check() {
        let (service, clock) = test_service();

        service.mint(7, fixed("promo", 1, 50)).await.unwrap();
        let id = service.list(0, 1).await.unwrap().items[0].id;

        let past = clock.now() - jiff::SignedDuration::from_secs(1);
        let err = service
            .update_fields(
                id,
                FieldPatch {
                    name: "renamed".to_string(),
                    quota: 75,
                    expires_at: Some(past),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MintError::Validation(ValidationError::ExpiredInPast { .. })
        ));

        // The record is untouched on rejection.
        let stored = service.get(id).await.unwrap();
        assert_eq!(stored.name, "promo");
        assert_eq!(stored.quota, 50);
    }

    #[tokio::test]
    async fn update_status_changes_only_the_status() {
        let (service, _) = test_service();

        service.mint(7, fixed("promo", 1, 50)).await.unwrap();
        let id = service.list(0, 1).await.unwrap().items[0].id;

        let updated = service.update_status(id, CodeStatus::Used).await.unwrap();
        assert_eq!(updated.status, CodeStatus::Used);
        assert_eq!(updated.name, "promo");
        assert_eq!(updated.quota, 50);

        let err = service
            .update_status(id + 999, CodeStatus::Used)
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_a_single_code() {
        let (service, _) = test_service();

        service.mint(7, fixed("promo", 2, 50)).await.unwrap();
        let id = service.list(0, 1).await.unwrap().items[0].id;

        service.delete(id).await.unwrap();
        assert!(matches!(
            service.get(id).await.unwrap_err(),
            MintError::NotFound(_)
        ));
        assert_eq!(service.list(0, 10).await.unwrap().total, 1);

        let err = service.delete(id).await.unwrap_err();
        assert!(matches!(err, MintError::NotFound(_)));
    }

    #[tokio::test]
    async fn purge_invalid_removes_spent_and_expired_codes() {
        let (service, clock) = test_service();

        // Three that will stay valid, one used, one disabled, one expiring.
        service.mint(7, fixed("keep", 3, 10)).await.unwrap();
        service.mint(7, fixed("used", 1, 10)).await.unwrap();
        service.mint(7, fixed("off", 1, 10)).await.unwrap();
        let soon = clock.now() + jiff::SignedDuration::from_secs(60);
        let expiring = MintRequest::builder()
            .name("expiring")
            .count(1)
            .mode(QuotaMode::Fixed { quota: 10 })
            .expires_at(Some(soon))
            .build();
        service.mint(7, expiring).await.unwrap();

        let all = service.list(0, 10).await.unwrap();
        let used_id = all.items.iter().find(|c| c.name == "used").unwrap().id;
        let off_id = all.items.iter().find(|c| c.name == "off").unwrap().id;
        service.update_status(used_id, CodeStatus::Used).await.unwrap();
        service.update_status(off_id, CodeStatus::Disabled).await.unwrap();

        // Advance past the expiration and purge.
        clock.set(soon + jiff::SignedDuration::from_secs(1));
        let removed = service.purge_invalid().await.unwrap();
        assert_eq!(removed, 3);

        let remaining = service.list(0, 10).await.unwrap();
        assert_eq!(remaining.total, 3);
        assert!(remaining.items.iter().all(|c| c.name == "keep"));
    }

    #[tokio::test]
    async fn concurrent_batches_do_not_share_keys_and_stay_coherent() {
        let repository = InMemoryRepository::new();
        let service = Arc::new(MinterService::new(repository));

        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.mint(1, fixed("batch-a", 100, 10)).await })
        };
        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.mint(2, fixed("batch-b", 100, 10)).await })
        };

        let keys_a = a.await.unwrap().unwrap();
        let keys_b = b.await.unwrap().unwrap();

        let mut all: HashSet<String> = keys_a.iter().cloned().collect();
        all.extend(keys_b.iter().cloned());
        assert_eq!(all.len(), 200);

        // Each batch's creation time is internally uniform.
        let page = service.list(0, 200).await.unwrap();
        assert_eq!(page.total, 200);
        for name in ["batch-a", "batch-b"] {
            let stamps: HashSet<Timestamp> = page
                .items
                .iter()
                .filter(|c| c.name == name)
                .map(|c| c.created_at)
                .collect();
            assert_eq!(stamps.len(), 1, "batch {name} spans multiple timestamps");
        }
    }

    #[tokio::test]
    async fn search_finds_by_name_key_and_id() {
        let (service, _) = test_service();

        service.mint(7, fixed("spring sale", 1, 10)).await.unwrap();
        service.mint(7, fixed("autumn sale", 1, 10)).await.unwrap();

        let by_name = service.search("spring", 0, 10).await.unwrap();
        assert_eq!(by_name.total, 1);
        assert_eq!(by_name.items[0].name, "spring sale");

        let key = by_name.items[0].key.clone();
        let by_key = service.search(&key, 0, 10).await.unwrap();
        assert_eq!(by_key.total, 1);

        let id = by_name.items[0].id;
        let by_id = service.search(&id.to_string(), 0, 10).await.unwrap();
        assert!(by_id.items.iter().any(|c| c.id == id));

        let none = service.search("winter", 0, 10).await.unwrap();
        assert_eq!(none.total, 0);
    }
}
