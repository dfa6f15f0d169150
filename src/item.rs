use chrono::{DateTime, Utc};
use std::time::Duration;

/// An immutable `(payload, expire_at)` pair.
///
/// Items are never mutated after insertion; eviction (physical removal) is
/// the only way an item stops existing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub payload: Vec<u8>,
    pub expire_at: DateTime<Utc>,
}

impl Item {
    /// Builds an item whose expiration is `now + ttl`.
    #[must_use]
    pub fn new(payload: Vec<u8>, ttl: Duration) -> Self {
        let expire_at = Utc::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        Self { payload, expire_at }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expire_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_item_is_not_expired() {
        let item = Item::new(b"hello".to_vec(), Duration::from_secs(5));
        assert!(!item.is_expired());
    }

    #[test]
    fn zero_ttl_item_is_expired_almost_immediately() {
        let item = Item::new(b"hello".to_vec(), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(item.is_expired());
    }
}
