use crate::analytics::Analytics;
use crate::bulk::config::BulkConfig;
use crate::errors::CacheError;
use crate::item::Item;
use crate::key::SubKey;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Composite-key bulk engine: items are stored in a `BTreeMap` keyed by
/// `"<expiration formatted to the second>:<sub-key hex>"`. Because the
/// chronological prefix sorts lexicographically, expired items form a
/// contiguous prefix of the in-order traversal, which lets eviction stop at
/// the first live entry instead of scanning the whole tree.
pub struct OrderedBulk {
    tree: RwLock<BTreeMap<String, Item>>,
    analytics: Analytics,
    config: BulkConfig,
    stop: Arc<AtomicBool>,
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl OrderedBulk {
    /// Creates a running bulk and starts its eviction loop on a dedicated
    /// thread.
    #[must_use]
    pub fn new(config: BulkConfig) -> Arc<Self> {
        let bulk = Arc::new(Self {
            tree: RwLock::new(BTreeMap::new()),
            analytics: Analytics::new(),
            config,
            stop: Arc::new(AtomicBool::new(false)),
        });
        let worker = Arc::clone(&bulk);
        std::thread::spawn(move || worker.eliminate_loop());
        bulk
    }

    /// Builds a detached, read-only snapshot from already-live items. No
    /// eviction loop is started for a snapshot.
    fn from_live(config: BulkConfig, items: BTreeMap<String, Item>) -> Arc<Self> {
        Arc::new(Self {
            tree: RwLock::new(items),
            analytics: Analytics::new(),
            config,
            stop: Arc::new(AtomicBool::new(true)),
        })
    }

    fn composite_key(sub_key: SubKey, item: &Item) -> String {
        format!("{}:{}", item.expire_at.format(TIME_FORMAT), sub_key.to_hex())
    }

    /// # Errors
    /// Returns [`CacheError::BulkFull`] if the configured item cap is
    /// exceeded and not disabled (`max_items == -1`).
    pub fn add(&self, sub_key: SubKey, payload: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        if !self.config.cap_disabled_for_ordered() {
            let len = self.tree.read().len();
            if len >= self.config.max_items as usize {
                return Err(CacheError::BulkFull);
            }
        }
        let item = Item::new(payload, ttl);
        let payload_len = item.len();
        let key = Self::composite_key(sub_key, &item);
        self.tree.write().insert(key, item);
        self.analytics.record_add(payload_len);
        Ok(())
    }

    /// Returns only live items, as `(composite_key, item)` pairs in
    /// chronological order, physically removing any expired entries
    /// observed along the way.
    #[must_use]
    pub fn get_alive(&self) -> Vec<(String, Item)> {
        let now = Utc::now();
        let mut tree = self.tree.write();
        let mut alive = Vec::with_capacity(tree.len());
        let mut expired = Vec::new();
        for (key, item) in tree.iter() {
            if item.expire_at > now {
                alive.push((key.clone(), item.clone()));
            } else {
                expired.push(key.clone());
            }
        }
        for key in &expired {
            tree.remove(key);
        }
        alive
    }

    /// A detached snapshot containing only the currently-live items. Shares
    /// the configuration but gets a fresh lock, fresh (zeroed) analytics,
    /// and no running eviction loop.
    #[must_use]
    pub fn get_alive_in_bulk(&self) -> Arc<Self> {
        let alive = self.get_alive();
        let tree: BTreeMap<String, Item> = alive.into_iter().collect();
        Self::from_live(self.config, tree)
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
        self.tree.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        self.tree.read().values().map(Item::len).sum()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec!["**********Ordered BULK**********".to_string()];
        for (key, item) in self.tree.read().iter() {
            let prefix = key.split(':').next().unwrap_or(key);
            lines.push(format!("------[{} bytes]@[{prefix}]------", item.len()));
        }
        lines.join("\n")
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// One eviction sweep: walk in order, collect a contiguous expired
    /// prefix, remove it. Returns the number of items removed.
    fn eliminate_once(&self) -> usize {
        let now = Utc::now();
        let mut tree = self.tree.write();
        let mut expired = Vec::new();
        for (key, item) in tree.iter() {
            if item.expire_at <= now {
                expired.push(key.clone());
            } else {
                break;
            }
        }
        let count = expired.len();
        for key in &expired {
            tree.remove(key);
        }
        count
    }

    fn eliminate_loop(&self) {
        while !self.stop.load(Ordering::Relaxed) {
            self.eliminate_once();
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
