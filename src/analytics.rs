use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic, monotonic counters attached to every bulk and to the container.
///
/// `queries` counts reads (`Get`); `memories` accumulates the byte length of
/// every payload that has ever been successfully inserted. Neither counter
/// is decremented on eviction — see the design notes on the bytes counter.
#[derive(Default)]
pub struct Analytics {
    pub queries: AtomicU64,
    pub memories: AtomicU64,
}

impl Analytics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_add(&self, payload_len: usize) {
        self.memories.fetch_add(payload_len as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            memories: self.memories.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`Analytics`], safe to serialize or log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AnalyticsSnapshot {
    pub queries: u64,
    pub memories: u64,
}
