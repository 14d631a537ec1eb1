use crate::validate::QuotaMode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Produces the quota sequence for a validated batch request.
///
/// The allocator owns its random source behind a mutex. The critical
/// section is a single draw, not the whole batch loop, so two concurrent
/// batches interleave their draws instead of serializing entirely.
#[derive(Debug)]
pub struct QuotaAllocator<N = StdRng> {
    rng: Mutex<N>,
}

impl QuotaAllocator<StdRng> {
    /// Allocator seeded from OS entropy; the production configuration.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl Default for QuotaAllocator<StdRng> {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl<N: Rng> QuotaAllocator<N> {
    /// Wraps an explicit random source. Tests inject a seeded `StdRng`
    /// to assert the exact values produced.
    pub fn new(rng: N) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Returns exactly `count` quota values for `mode`.
    ///
    /// Bounds are assumed validated: positive fixed quota, or
    /// `0 < min_quota < max_quota` in random mode.
    pub fn allocate(&self, mode: QuotaMode, count: usize) -> Vec<i64> {
        match mode {
            QuotaMode::Fixed { quota } => vec![quota; count],
            QuotaMode::Random {
                min_quota,
                max_quota,
            } => (0..count).map(|_| self.draw(min_quota, max_quota)).collect(),
        }
    }

    fn draw(&self, min_quota: i64, max_quota: i64) -> i64 {
        // A poisoned lock means a draw panicked mid-mutation; the
        // generator state is unrecoverable at that point.
        let mut rng = self.rng.lock().expect("quota rng lock poisoned");
        rng.random_range(min_quota..=max_quota)
    }
}
