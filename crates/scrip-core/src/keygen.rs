use uuid::Uuid;

/// Trait for generating redemption keys.
///
/// Implementations are pure generators that don't interact with storage.
/// A key is the redemption credential itself, so production generators
/// must be collision-resistant and must not derive keys from a counter
/// (predictable keys are guessable keys).
pub trait KeyGenerator: Send + Sync + 'static {
    /// Generates a new key, unique across the lifetime of the system.
    fn generate(&self) -> String;
}

/// UUID v4 key generator; the production implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// A deterministic key generator using a prefix and a sequential counter.
///
/// Keys are predictable, so this is unsuitable for production credentials;
/// it exists for tests and fixtures that need to assert on exact keys.
#[derive(Debug)]
pub struct SequentialKeyGenerator {
    counter: std::sync::atomic::AtomicU64,
    prefix: String,
}

impl Clone for SequentialKeyGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(
                self.counter.load(std::sync::atomic::Ordering::SeqCst),
            ),
            prefix: self.prefix.clone(),
        }
    }
}

impl SequentialKeyGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(0),
            prefix: prefix.into(),
        }
    }

    /// Creates a generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl KeyGenerator for SequentialKeyGenerator {
    fn generate(&self) -> String {
        let count = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("{}{:06}", self.prefix, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_keys_are_distinct() {
        let generator = UuidKeyGenerator;
        let keys: HashSet<String> = (0..1_000).map(|_| generator.generate()).collect();
        assert_eq!(keys.len(), 1_000);
    }

    #[test]
    fn uuid_keys_are_hyphenated_uuids() {
        let key = UuidKeyGenerator.generate();
        assert_eq!(key.len(), 36);
        assert!(Uuid::parse_str(&key).is_ok());
    }

    #[test]
    fn sequential_generator_produces_sequential_keys() {
        let generator = SequentialKeyGenerator::with_prefix("sk");

        assert_eq!(generator.generate(), "sk000000");
        assert_eq!(generator.generate(), "sk000001");
        assert_eq!(generator.generate(), "sk000002");
    }

    #[test]
    fn sequential_generator_with_offset() {
        let generator = SequentialKeyGenerator::with_offset("sk", 1_000);

        assert_eq!(generator.generate(), "sk001000");
        assert_eq!(generator.generate(), "sk001001");
    }

    #[test]
    fn clone_preserves_counter_state() {
        let generator = SequentialKeyGenerator::with_prefix("sk");
        generator.generate();
        generator.generate();

        let cloned = generator.clone();

        assert_eq!(generator.generate(), "sk000002");
        assert_eq!(cloned.generate(), "sk000002");
    }

    #[test]
    fn generators_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UuidKeyGenerator>();
        assert_send_sync::<SequentialKeyGenerator>();
    }
}
