//! Pluggable per-bulk storage engines behind one contract.
//!
//! [`Bulk`] is a two-variant enum dispatch over [`OrderedBulk`] and
//! [`UnorderedBulk`] — a trait object would be overkill for a closed set of
//! two implementations, so the contract is documented on the inherent
//! methods each variant shares rather than expressed as a `dyn Trait`.

mod config;
mod ordered;
mod unordered;

pub use config::BulkConfig;
pub use ordered::OrderedBulk;
pub use unordered::UnorderedBulk;

use crate::analytics::Analytics;
use crate::errors::CacheError;
use crate::item::Item;
use crate::key::SubKey;
use std::sync::Arc;
use std::time::Duration;

/// Which storage engine a bulk (or a whole container) uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Ordered,
    Unordered,
}

impl EngineKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
        }
    }
}

impl std::str::FromStr for EngineKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" => Ok(Self::Ordered),
            "unordered" => Ok(Self::Unordered),
            other => Err(CacheError::InvalidRequest(format!("unknown engine kind: {other}"))),
        }
    }
}

/// A named collection of items, backed by whichever engine the container
/// was configured with.
#[derive(Clone)]
pub enum Bulk {
    Ordered(Arc<OrderedBulk>),
    Unordered(Arc<UnorderedBulk>),
}

impl Bulk {
    /// Creates a running bulk of the given engine kind; its eviction loop
    /// starts immediately.
    #[must_use]
    pub fn new(kind: EngineKind, config: BulkConfig) -> Self {
        match kind {
            EngineKind::Ordered => Self::Ordered(OrderedBulk::new(config)),
            EngineKind::Unordered => Self::Unordered(UnorderedBulk::new(config)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Ordered(_) => EngineKind::Ordered,
            Self::Unordered(_) => EngineKind::Unordered,
        }
    }

    /// # Errors
    /// Returns [`CacheError::BulkFull`] if the configured item cap is
    /// exceeded.
    pub fn add(&self, sub_key: SubKey, payload: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        match self {
            Self::Ordered(b) => b.add(sub_key, payload, ttl),
            Self::Unordered(b) => b.add(sub_key, payload, ttl),
        }
    }

    #[must_use]
    pub fn get_alive(&self) -> Vec<(String, Item)> {
        match self {
            Self::Ordered(b) => b.get_alive(),
            Self::Unordered(b) => b.get_alive(),
        }
    }

    #[must_use]
    pub fn get_alive_in_bulk(&self) -> Self {
        match self {
            Self::Ordered(b) => Self::Ordered(b.get_alive_in_bulk()),
            Self::Unordered(b) => Self::Unordered(b.get_alive_in_bulk()),
        }
    }

    #[must_use]
    pub fn config(&self) -> BulkConfig {
        match self {
            Self::Ordered(b) => b.config(),
            Self::Unordered(b) => b.config(),
        }
    }

    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        match self {
            Self::Ordered(b) => b.analytics(),
            Self::Unordered(b) => b.analytics(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ordered(b) => b.len(),
            Self::Unordered(b) => b.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        match self {
            Self::Ordered(b) => b.bytes(),
            Self::Unordered(b) => b.bytes(),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Ordered(b) => b.render(),
            Self::Unordered(b) => b.render(),
        }
    }

    /// Signals the eviction loop to stop. Idempotent.
    pub fn stop(&self) {
        match self {
            Self::Ordered(b) => b.stop(),
            Self::Unordered(b) => b.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_kind_round_trips_through_str() {
        assert_eq!("ordered".parse::<EngineKind>().unwrap(), EngineKind::Ordered);
        assert_eq!("unordered".parse::<EngineKind>().unwrap(), EngineKind::Unordered);
        assert!("garbage".parse::<EngineKind>().is_err());
    }

    #[test]
    fn bulk_dispatch_works_for_both_variants() {
        for kind in [EngineKind::Ordered, EngineKind::Unordered] {
            let bulk = Bulk::new(kind, BulkConfig::default_for(kind));
            let key = crate::key::normalize(b"k").unwrap();
            bulk.add(key, b"v".to_vec(), Duration::from_secs(5)).unwrap();
            assert_eq!(bulk.len(), 1);
            assert_eq!(bulk.get_alive().len(), 1);
            bulk.stop();
        }
    }
}
