use crate::error::ValidationError;
use jiff::Timestamp;
use typed_builder::TypedBuilder;

/// Hard ceiling on codes per batch. A product constant, not an
/// operational tunable.
pub const MAX_BATCH_SIZE: i64 = 100;

/// Name length bound, counted in characters, not bytes.
pub const MAX_NAME_CHARS: usize = 20;

/// How quota values are assigned within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaMode {
    /// Every code in the batch receives the same quota.
    Fixed { quota: i64 },
    /// Each code's quota is drawn uniformly from `[min_quota, max_quota]`.
    Random { min_quota: i64, max_quota: i64 },
}

/// A validated-on-entry creation request for one batch of codes.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MintRequest {
    #[builder(setter(into))]
    pub name: String,
    pub count: i64,
    pub mode: QuotaMode,
    #[builder(default)]
    pub expires_at: Option<Timestamp>,
}

/// Checks a creation request against the structural constraints.
///
/// Pure and side-effect-free; checks run in a fixed order and the first
/// failure is returned without aggregating the rest.
pub fn validate_mint_request(
    request: &MintRequest,
    now: Timestamp,
) -> Result<(), ValidationError> {
    let name_chars = request.name.chars().count();
    if name_chars == 0 || name_chars > MAX_NAME_CHARS {
        return Err(ValidationError::InvalidName(name_chars));
    }

    if request.count <= 0 {
        return Err(ValidationError::InvalidCount(request.count));
    }
    if request.count > MAX_BATCH_SIZE {
        return Err(ValidationError::CountTooLarge(request.count));
    }

    match request.mode {
        QuotaMode::Random {
            min_quota,
            max_quota,
        } => {
            if min_quota <= 0 || max_quota <= 0 {
                return Err(ValidationError::InvalidRandomBounds {
                    min: min_quota,
                    max: max_quota,
                });
            }
            if min_quota >= max_quota {
                return Err(ValidationError::MinNotLessThanMax {
                    min: min_quota,
                    max: max_quota,
                });
            }
        }
        QuotaMode::Fixed { quota } => {
            if quota <= 0 {
                return Err(ValidationError::InvalidQuota(quota));
            }
        }
    }

    validate_expiration(request.expires_at, now)
}

/// Rejects expirations that already lie in the past.
///
/// Shared by batch creation and the full-field update flow; `None`
/// (never expires) is always accepted.
pub fn validate_expiration(
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), ValidationError> {
    match expires_at {
        Some(expires_at) if expires_at < now => {
            Err(ValidationError::ExpiredInPast { expires_at, now })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn fixed_request(name: &str, count: i64, quota: i64) -> MintRequest {
        MintRequest::builder()
            .name(name)
            .count(count)
            .mode(QuotaMode::Fixed { quota })
            .build()
    }

    fn random_request(count: i64, min_quota: i64, max_quota: i64) -> MintRequest {
        MintRequest::builder()
            .name("promo")
            .count(count)
            .mode(QuotaMode::Random {
                min_quota,
                max_quota,
            })
            .build()
    }

    #[test]
    fn accepts_a_plain_fixed_request() {
        assert_eq!(
            validate_mint_request(&fixed_request("promo", 3, 100), now()),
            Ok(())
        );
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            validate_mint_request(&fixed_request("", 1, 1), now()),
            Err(ValidationError::InvalidName(0))
        );
    }

    #[test]
    fn name_bounds_are_counted_in_characters() {
        // 20 CJK characters are 60 bytes; they must still be accepted.
        let twenty = "码".repeat(20);
        assert_eq!(
            validate_mint_request(&fixed_request(&twenty, 1, 1), now()),
            Ok(())
        );

        let twenty_one = "码".repeat(21);
        assert_eq!(
            validate_mint_request(&fixed_request(&twenty_one, 1, 1), now()),
            Err(ValidationError::InvalidName(21))
        );
    }

    #[test]
    fn single_character_name_is_accepted() {
        assert_eq!(validate_mint_request(&fixed_request("x", 1, 1), now()), Ok(()));
    }

    #[test]
    fn count_boundaries() {
        assert_eq!(
            validate_mint_request(&fixed_request("promo", 0, 1), now()),
            Err(ValidationError::InvalidCount(0))
        );
        assert_eq!(
            validate_mint_request(&fixed_request("promo", -5, 1), now()),
            Err(ValidationError::InvalidCount(-5))
        );
        assert_eq!(validate_mint_request(&fixed_request("promo", 1, 1), now()), Ok(()));
        assert_eq!(
            validate_mint_request(&fixed_request("promo", 100, 1), now()),
            Ok(())
        );
        assert_eq!(
            validate_mint_request(&fixed_request("promo", 101, 1), now()),
            Err(ValidationError::CountTooLarge(101))
        );
    }

    #[test]
    fn random_bounds_must_be_positive() {
        assert_eq!(
            validate_mint_request(&random_request(1, 0, 10), now()),
            Err(ValidationError::InvalidRandomBounds { min: 0, max: 10 })
        );
        assert_eq!(
            validate_mint_request(&random_request(1, 5, -1), now()),
            Err(ValidationError::InvalidRandomBounds { min: 5, max: -1 })
        );
    }

    #[test]
    fn random_bounds_must_span_a_real_range() {
        assert_eq!(
            validate_mint_request(&random_request(1, 10, 10), now()),
            Err(ValidationError::MinNotLessThanMax { min: 10, max: 10 })
        );
        assert_eq!(validate_mint_request(&random_request(1, 9, 10), now()), Ok(()));
    }

    #[test]
    fn fixed_quota_must_be_positive() {
        assert_eq!(
            validate_mint_request(&fixed_request("promo", 1, 0), now()),
            Err(ValidationError::InvalidQuota(0))
        );
        assert_eq!(
            validate_mint_request(&fixed_request("promo", 1, -100), now()),
            Err(ValidationError::InvalidQuota(-100))
        );
    }

    #[test]
    fn expiration_boundaries() {
        let now = now();
        let past = now - jiff::SignedDuration::from_secs(1);
        let future = now + jiff::SignedDuration::from_secs(1_000);

        assert_eq!(validate_expiration(None, now), Ok(()));
        assert_eq!(validate_expiration(Some(future), now), Ok(()));
        assert_eq!(
            validate_expiration(Some(past), now),
            Err(ValidationError::ExpiredInPast {
                expires_at: past,
                now
            })
        );

        let request = MintRequest::builder()
            .name("promo")
            .count(1)
            .mode(QuotaMode::Fixed { quota: 1 })
            .expires_at(Some(past))
            .build();
        assert_eq!(
            validate_mint_request(&request, now),
            Err(ValidationError::ExpiredInPast {
                expires_at: past,
                now
            })
        );
    }

    #[test]
    fn first_failure_wins() {
        // Both the name and the count are bad; the name check runs first.
        let request = MintRequest::builder()
            .name("")
            .count(0)
            .mode(QuotaMode::Fixed { quota: 0 })
            .build();
        assert_eq!(
            validate_mint_request(&request, now()),
            Err(ValidationError::InvalidName(0))
        );
    }
}
