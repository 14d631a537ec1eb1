use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use scrip_core::error::Result;
use scrip_core::{CodePage, RedemptionCode, Repository, StorageError};
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory implementation of the repository contract using DashMap.
///
/// Carries a secondary key index so the global key-uniqueness invariant
/// holds without a database. Ids are assigned from an atomic counter
/// starting at 1; 0 stays the "unassigned" marker.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    codes: DashMap<i64, RedemptionCode>,
    key_index: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            codes: DashMap::new(),
            key_index: DashMap::new(),
            next_id: AtomicI64::new(0),
        }
    }

    fn sorted_page(mut matches: Vec<RedemptionCode>, offset: u64, limit: u64) -> CodePage {
        matches.sort_by(|a, b| b.id.cmp(&a.id));
        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        CodePage { items, total }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_batch(&self, codes: &[RedemptionCode]) -> Result<()> {
        // Reserve every key before inserting anything so a duplicate
        // anywhere in the batch leaves the store untouched. The entry
        // guard must be dropped before any rollback touches the map.
        let mut reserved: Vec<&str> = Vec::with_capacity(codes.len());
        for code in codes {
            let conflict = match self.key_index.entry(code.key.clone()) {
                Entry::Occupied(_) => true,
                Entry::Vacant(slot) => {
                    slot.insert(0);
                    false
                }
            };
            if conflict {
                for key in reserved {
                    self.key_index.remove(key);
                }
                return Err(StorageError::Conflict(code.key.clone()));
            }
            reserved.push(&code.key);
        }

        for code in codes {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let mut stored = code.clone();
            stored.id = id;
            self.key_index.insert(stored.key.clone(), id);
            self.codes.insert(id, stored);
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<RedemptionCode>> {
        Ok(self.codes.get(&id).map(|entry| entry.value().clone()))
    }

    async fn search(&self, keyword: &str, offset: u64, limit: u64) -> Result<CodePage> {
        let id_match: Option<i64> = keyword.parse().ok();
        let matches: Vec<RedemptionCode> = self
            .codes
            .iter()
            .filter(|entry| {
                let code = entry.value();
                id_match == Some(code.id) || code.name.contains(keyword) || code.key == keyword
            })
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted_page(matches, offset, limit))
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<CodePage> {
        let all: Vec<RedemptionCode> = self
            .codes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted_page(all, offset, limit))
    }

    async fn update(&self, code: &RedemptionCode) -> Result<bool> {
        // Keys are immutable through the update path, so the key index
        // stays valid.
        match self.codes.get_mut(&code.id) {
            Some(mut slot) => {
                *slot = code.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        match self.codes.remove(&id) {
            Some((_, code)) => {
                self.key_index.remove(&code.key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_invalid(&self, now: Timestamp) -> Result<u64> {
        let doomed: Vec<i64> = self
            .codes
            .iter()
            .filter(|entry| entry.value().is_invalid(now))
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in doomed {
            if let Some((_, code)) = self.codes.remove(&id) {
                self.key_index.remove(&code.key);
                removed += 1;
            }
        }
        Ok(removed)
    }
}
