use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use moka::future::Cache;

use crate::store::Store;

const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;
const CACHE_CAPACITY: u64 = 100_000;
const CACHE_TTL: Duration = Duration::from_secs(86400);

/// Fast pre-check for registration.
///
/// The cuckoo filter answers "definitely free" without touching the store;
/// the cache remembers addresses known to be taken. Anything the filter
/// flags but the cache misses is confirmed against the store, so a false
/// positive only costs a lookup.
pub struct EmailIndex {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, bool>,
}

impl Default for EmailIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

impl EmailIndex {
    pub fn new() -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            taken: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    pub fn might_exist(&self, email: &str) -> bool {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&normalize(email))
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.taken.get(&normalize(email)).await.unwrap_or(false)
    }

    pub async fn mark_taken(&self, email: &str) {
        let email = normalize(email);
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(&email);
        self.taken.insert(email, true).await;
    }

    /// `true` when the address is certainly in use. Consults the store only
    /// when the in-process structures cannot decide.
    pub async fn is_registered(&self, store: &dyn Store, email: &str) -> Result<bool> {
        if !self.might_exist(email) {
            return Ok(false);
        }
        if self.is_taken(email).await {
            return Ok(true);
        }
        let found = store
            .find_employee_by_email(&normalize(email))
            .await
            .map_err(|e| anyhow::anyhow!("email lookup failed: {}", e))?
            .is_some();
        if found {
            self.taken.insert(normalize(email), true).await;
        }
        Ok(found)
    }

    /// Load every registered address in batches.
    pub async fn warmup(&self, store: &dyn Store, batch_size: usize) -> Result<usize> {
        let emails = store
            .all_emails()
            .await
            .map_err(|e| anyhow::anyhow!("email warmup failed: {}", e))?;

        for batch in emails.chunks(batch_size.max(1)) {
            let normalized: Vec<String> = batch.iter().map(|e| normalize(e)).collect();
            {
                let mut filter = self.filter.write().unwrap_or_else(PoisonError::into_inner);
                for email in &normalized {
                    filter.add(email);
                }
            }
            let inserts: Vec<_> = normalized
                .into_iter()
                .map(|e| self.taken.insert(e, true))
                .collect();
            futures::future::join_all(inserts).await;
        }

        tracing::info!(total = emails.len(), "email index warmup complete");
        Ok(emails.len())
    }
}
