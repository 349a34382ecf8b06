//! Load-once cache of height slices.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::{OnceCell, RwLock};

use super::slice::HeightSlice;
use crate::error::Result;
use crate::types::{CacheStats, SliceKey};

type Slot = Arc<OnceCell<Arc<HeightSlice>>>;

/// Cache mapping (area, height) to an immutable slice.
///
/// Each key owns a `OnceCell`, so concurrent requests for the same key share
/// a single load. A failed load drops its slot and the next request retries.
/// Loaded entries are never evicted.
#[derive(Default)]
pub struct SliceCache {
    slots: RwLock<HashMap<SliceKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
}

impl SliceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached slice for `key`, running `load` on first use.
    pub async fn get_or_load<F, Fut>(&self, key: &SliceKey, load: F) -> Result<Arc<HeightSlice>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HeightSlice>>,
    {
        let slot = self.slot(key).await;

        if let Some(slice) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!("slice_cache_hits_total").increment(1);
            return Ok(Arc::clone(slice));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("slice_cache_misses_total").increment(1);

        let result = slot
            .get_or_try_init(|| async move {
                let slice = load().await?;
                self.loads.fetch_add(1, Ordering::Relaxed);
                counter!("slice_loads_total").increment(1);
                Ok::<_, crate::error::PodError>(Arc::new(slice))
            })
            .await;

        match result {
            Ok(slice) => Ok(Arc::clone(slice)),
            Err(e) => {
                self.discard_empty(key, &slot).await;
                Err(e)
            }
        }
    }

    /// Drop the slot for `key` after a failed load, unless another caller
    /// has since filled or replaced it.
    async fn discard_empty(&self, key: &SliceKey, slot: &Slot) {
        let mut slots = self.slots.write().await;
        let stale = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            slots.remove(key);
        }
    }

    /// Number of keys with a slot, loaded or in flight.
    #[cfg(test)]
    async fn slot_count(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Fetch the slot for a key, inserting an empty one if needed.
    async fn slot(&self, key: &SliceKey) -> Slot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(key) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Slice for `key` if already loaded.
    pub async fn get(&self, key: &SliceKey) -> Option<Arc<HeightSlice>> {
        let slots = self.slots.read().await;
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Check whether `key` is loaded.
    pub async fn contains(&self, key: &SliceKey) -> bool {
        self.get(key).await.is_some()
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let slots = self.slots.read().await;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            entries: slots.values().filter(|slot| slot.initialized()).count(),
        }
    }
}
