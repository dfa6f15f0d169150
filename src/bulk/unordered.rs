use crate::analytics::Analytics;
use crate::bulk::config::BulkConfig;
use crate::errors::CacheError;
use crate::item::Item;
use crate::key::SubKey;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Flat-map bulk engine: the sub-key is the storage key directly. Eviction
/// is an O(n) scan on a fixed cadence; there is no ordering-based shortcut.
pub struct UnorderedBulk {
    store: RwLock<HashMap<SubKey, Item>>,
    analytics: Analytics,
    config: BulkConfig,
    stop: Arc<AtomicBool>,
}

impl UnorderedBulk {
    #[must_use]
    pub fn new(config: BulkConfig) -> Arc<Self> {
        let bulk = Arc::new(Self {
            store: RwLock::new(HashMap::new()),
            analytics: Analytics::new(),
            config,
            stop: Arc::new(AtomicBool::new(false)),
        });
        let worker = Arc::clone(&bulk);
        std::thread::spawn(move || worker.eliminate_loop());
        bulk
    }

    fn from_live(config: BulkConfig, items: HashMap<SubKey, Item>) -> Arc<Self> {
        Arc::new(Self {
            store: RwLock::new(items),
            analytics: Analytics::new(),
            config,
            stop: Arc::new(AtomicBool::new(true)),
        })
    }

    /// # Errors
    /// Returns [`CacheError::BulkFull`] if the configured item cap is
    /// exceeded. Unlike the ordered engine, a negative cap here simply
    /// rejects every insert rather than disabling the check.
    pub fn add(&self, sub_key: SubKey, payload: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let len = self.store.read().len();
        let cap_ok = self.config.max_items >= 0 && len < self.config.max_items as usize;
        if !cap_ok {
            return Err(CacheError::BulkFull);
        }
        let item = Item::new(payload, ttl);
        let payload_len = item.len();
        self.store.write().insert(sub_key, item);
        self.analytics.record_add(payload_len);
        Ok(())
    }

    #[must_use]
    pub fn get_alive(&self) -> Vec<(String, Item)> {
        let now = Utc::now();
        let mut store = self.store.write();
        let mut alive = Vec::with_capacity(store.len());
        let mut expired = Vec::new();
        for (key, item) in store.iter() {
            if item.expire_at > now {
                alive.push((key.to_hex(), item.clone()));
            } else {
                expired.push(*key);
            }
        }
        for key in &expired {
            store.remove(key);
        }
        alive
    }

    #[must_use]
    pub fn get_alive_in_bulk(&self) -> Arc<Self> {
        let now = Utc::now();
        let mut store = self.store.write();
        let mut alive = HashMap::with_capacity(store.len());
        let mut expired = Vec::new();
        for (key, item) in store.iter() {
            if item.expire_at > now {
                alive.insert(*key, item.clone());
            } else {
                expired.push(*key);
            }
        }
        for key in &expired {
            store.remove(key);
        }
        drop(store);
        Self::from_live(self.config, alive)
    }

    #[must_use]
    pub fn config(&self) -> BulkConfig {
        self.config
    }

    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        self.store.read().values().map(Item::len).sum()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec!["**********Unordered BULK**********".to_string()];
        for item in self.store.read().values() {
            lines.push(format!("------[{} bytes]@[{}]------", item.len(), item.expire_at));
        }
        lines.join("\n")
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    fn eliminate_once(&self) -> usize {
        let now = Utc::now();
        let mut store = self.store.write();
        let expired: Vec<SubKey> = store
            .iter()
            .filter(|(_, item)| item.expire_at <= now)
            .map(|(k, _)| *k)
            .collect();
        let count = expired.len();
        for key in &expired {
            store.remove(key);
        }
        count
    }

    fn eliminate_loop(&self) {
        while !self.stop.load(Ordering::Relaxed) {
            std::thread::sleep(self.config.eliminate_interval);
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            self.eliminate_once();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::EngineKind;

    fn sub_key(tag: u8) -> SubKey {
        let mut buf = [0u8; 32];
        buf[0] = tag;
        SubKey(buf)
    }

    #[test]
    fn cap_enforced_at_exact_boundary() {
        let mut cfg = BulkConfig::default_for(EngineKind::Unordered);
        cfg.max_items = 2;
        let bulk = UnorderedBulk::new(cfg);
        assert!(bulk.add(sub_key(1), b"a".to_vec(), Duration::from_secs(5)).is_ok());
        assert!(bulk.add(sub_key(2), b"b".to_vec(), Duration::from_secs(5)).is_ok());
        assert!(matches!(
            bulk.add(sub_key(3), b"c".to_vec(), Duration::from_secs(5)),
            Err(CacheError::BulkFull)
        ));
        assert_eq!(bulk.len(), 2);
        bulk.stop();
    }

    #[test]
    fn expired_items_are_excluded_from_get_alive() {
        let bulk = UnorderedBulk::new(BulkConfig::default_for(EngineKind::Unordered));
        bulk.add(sub_key(1), b"gone".to_vec(), Duration::from_millis(0)).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(bulk.get_alive().is_empty());
        assert_eq!(bulk.len(), 0, "GetAlive must physically reclaim expired entries");
        bulk.stop();
    }

    #[test]
    fn same_subkey_overwrites() {
        let bulk = UnorderedBulk::new(BulkConfig::default_for(EngineKind::Unordered));
        bulk.add(sub_key(9), b"first".to_vec(), Duration::from_secs(5)).unwrap();
        bulk.add(sub_key(9), b"second".to_vec(), Duration::from_secs(5)).unwrap();
        assert_eq!(bulk.len(), 1);
        let alive = bulk.get_alive();
        assert_eq!(alive[0].1.payload, b"second");
        bulk.stop();
    }
}
