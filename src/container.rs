//! The process-wide dictionary of bulks and its public operations.

use crate::analytics::Analytics;
use crate::bulk::{Bulk, BulkConfig, EngineKind};
use crate::errors::CacheError;
use crate::item::Item;
use crate::key;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

const REAPER_INTERVAL: Duration = Duration::from_secs(3);

/// A named dictionary of bulks sharing one engine kind.
///
/// Every bulk is reachable only through the container's map; removing a
/// bulk from the map and signalling its eviction loop to stop are the only
/// ways a bulk is destroyed.
pub struct Container {
    name: String,
    kind: EngineKind,
    bulks: parking_lot::RwLock<HashMap<String, Bulk>>,
    analytics: Analytics,
    reaper_stop: Arc<AtomicBool>,
}

impl Container {
    /// Creates an empty container and starts its bulk reaper.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EngineKind) -> Arc<Self> {
        let container = Arc::new(Self {
            name: name.into(),
            kind,
            bulks: parking_lot::RwLock::new(HashMap::new()),
            analytics: Analytics::new(),
            reaper_stop: Arc::new(AtomicBool::new(false)),
        });
        let worker = Arc::clone(&container);
        std::thread::spawn(move || worker.reap_loop());
        container
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn engine_kind(&self) -> EngineKind {
        self.kind
    }

    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    /// Ensures a bulk exists (creating one with default config if absent),
    /// normalizes `sub_key`, then inserts. Increments the container's byte
    /// counter by `payload.len()` after the delegated insert succeeds.
    ///
    /// # Errors
    /// Returns [`CacheError::RandomSource`] if an empty `sub_key` could not
    /// be randomized, or [`CacheError::BulkFull`] if the bulk's cap is
    /// exceeded. Neither case mutates the container.
    pub fn add(
        &self,
        bulk_name: &str,
        sub_key: &[u8],
        payload: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let normalized = key::normalize(sub_key)?;
        let bulk = self.ensure_bulk(bulk_name);
        let payload_len = payload.len();
        bulk.add(normalized, payload, ttl)?;
        self.analytics.record_add(payload_len);
        Ok(())
    }

    fn ensure_bulk(&self, name: &str) -> Bulk {
        if let Some(bulk) = self.bulks.read().get(name) {
            return bulk.clone();
        }
        let mut bulks = self.bulks.write();
        bulks
            .entry(name.to_string())
            .or_insert_with(|| Bulk::new(self.kind, BulkConfig::default_for(self.kind)))
            .clone()
    }

    /// Idempotent create-or-get with an explicit config.
    #[must_use]
    pub fn add_bulk(&self, bulk_name: &str, config: BulkConfig) -> Bulk {
        let mut bulks = self.bulks.write();
        bulks.entry(bulk_name.to_string()).or_insert_with(|| Bulk::new(self.kind, config)).clone()
    }

    /// Returns the bulk's live snapshot and increments the query counter.
    #[must_use]
    pub fn get(&self, bulk_name: &str) -> (Vec<(String, Item)>, bool) {
        self.analytics.record_query();
        match self.bulks.read().get(bulk_name) {
            Some(bulk) => (bulk.get_alive(), true),
            None => (Vec::new(), false),
        }
    }

    /// Returns the owned bulk handle, no snapshot.
    #[must_use]
    pub fn get_bulk(&self, bulk_name: &str) -> Option<Bulk> {
        self.bulks.read().get(bulk_name).cloned()
    }

    /// Returns a detached snapshot bulk of only the live items, or `None`
    /// if the bulk is absent or has no live items.
    #[must_use]
    pub fn get_bulk_items(&self, bulk_name: &str) -> Option<Bulk> {
        let bulk = self.get_bulk(bulk_name)?;
        let snapshot = bulk.get_alive_in_bulk();
        if snapshot.is_empty() { None } else { Some(snapshot) }
    }

    #[must_use]
    pub fn has(&self, bulk_name: &str) -> bool {
        self.bulks.read().contains_key(bulk_name)
    }

    /// Signals the bulk to stop its eviction loop, then drops the mapping.
    pub fn remove(&self, bulk_name: &str) {
        let removed = self.bulks.write().remove(bulk_name);
        if let Some(bulk) = removed {
            bulk.stop();
        }
    }

    pub fn flush(&self) {
        let old = std::mem::take(&mut *self.bulks.write());
        for bulk in old.into_values() {
            bulk.stop();
        }
    }

    /// Debug-only: passes a live snapshot of each bulk to `handler`.
    pub fn each<F: FnMut(&str, &Bulk)>(&self, mut handler: F) {
        let names_and_bulks: Vec<(String, Bulk)> =
            self.bulks.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        for (name, bulk) in names_and_bulks {
            handler(&name, &bulk.get_alive_in_bulk());
        }
    }

    #[must_use]
    pub fn bulk_names(&self) -> Vec<String> {
        self.bulks.read().keys().cloned().collect()
    }

    /// Stops the reaper and every bulk's eviction loop. Intended for
    /// orderly shutdown; the container remains otherwise usable afterward.
    pub fn shutdown(&self) {
        self.reaper_stop.store(true, Ordering::Relaxed);
        for bulk in self.bulks.read().values() {
            bulk.stop();
        }
    }

    /// Wakes on a fixed cadence and removes every bulk whose live count is
    /// zero. Does not hold the write lock across `remove`'s own locking.
    fn reap_loop(&self) {
        while !self.reaper_stop.load(Ordering::Relaxed) {
            std::thread::sleep(REAPER_INTERVAL);
            if self.reaper_stop.load(Ordering::Relaxed) {
                break;
            }
            let empty: Vec<String> = self
                .bulks
                .read()
                .iter()
                .filter(|(_, bulk)| bulk.get_alive().is_empty())
                .map(|(name, _)| name.clone())
                .collect();
            for name in empty {
                self.remove(&name);
            }
        }
    }
}

static SHARED: LazyLock<Arc<Container>> =
    LazyLock::new(|| Container::new("default", EngineKind::Ordered));

/// The process-wide default container, lazily initialized on first use.
#[must_use]
pub fn shared() -> Arc<Container> {
    Arc::clone(&SHARED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_creates_bulk_lazily_and_get_returns_it() {
        let c = Container::new("t1", EngineKind::Ordered);
        assert!(!c.has("videos"));
        c.add("videos", b"", b"frame".to_vec(), Duration::from_secs(5)).unwrap();
        assert!(c.has("videos"));
        let (items, present) = c.get("videos");
        assert!(present);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].1.payload, b"frame");
        c.shutdown();
    }

    #[test]
    fn get_on_missing_bulk_returns_empty_false() {
        let c = Container::new("t2", EngineKind::Ordered);
        let (items, present) = c.get("nope");
        assert!(!present);
        assert!(items.is_empty());
        c.shutdown();
    }

    #[test]
    fn remove_drops_bulk_and_stops_its_loop() {
        let c = Container::new("t3", EngineKind::Ordered);
        c.add("b", b"", b"v".to_vec(), Duration::from_secs(5)).unwrap();
        assert!(c.has("b"));
        c.remove("b");
        assert!(!c.has("b"));
        c.shutdown();
    }

    #[test]
    fn flush_drops_every_bulk() {
        let c = Container::new("t4", EngineKind::Ordered);
        c.add("a", b"", b"v".to_vec(), Duration::from_secs(5)).unwrap();
        c.add("b", b"", b"v".to_vec(), Duration::from_secs(5)).unwrap();
        c.flush();
        assert!(c.bulk_names().is_empty());
        c.shutdown();
    }

    #[test]
    fn add_increments_byte_counter_by_payload_len() {
        let c = Container::new("t5", EngineKind::Ordered);
        c.add("b", b"", b"hello".to_vec(), Duration::from_secs(5)).unwrap();
        c.add("b", b"", b"world!".to_vec(), Duration::from_secs(5)).unwrap();
        assert_eq!(c.analytics().snapshot().memories, 11);
        c.shutdown();
    }

    #[test]
    fn get_bulk_items_is_none_when_empty_or_absent() {
        let c = Container::new("t6", EngineKind::Ordered);
        assert!(c.get_bulk_items("absent").is_none());
        c.add("b", b"", b"v".to_vec(), Duration::from_millis(0)).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(c.get_bulk_items("b").is_none());
        c.shutdown();
    }
}
