use crate::bulk::EngineKind;
use std::time::Duration;

/// Tunables shared by both bulk engine variants.
///
/// `max_items` uses `i64` so that `-1` (unbounded, ordered engine only) is
/// representable without a separate `Option`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulkConfig {
    pub max_items: i64,
    pub eliminate_interval: Duration,
    /// Reserved flag with no effect on core semantics (see open questions).
    pub enabled_cache: bool,
}

impl BulkConfig {
    pub const DEFAULT_MAX_ITEMS: i64 = (1 << 16) - 1;

    #[must_use]
    pub fn default_for(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Unordered => Self {
                max_items: Self::DEFAULT_MAX_ITEMS,
                eliminate_interval: Duration::from_millis(800),
                enabled_cache: false,
            },
            EngineKind::Ordered => Self {
                max_items: Self::DEFAULT_MAX_ITEMS,
                eliminate_interval: Duration::from_millis(5),
                enabled_cache: false,
            },
        }
    }

    /// Whether the item-count cap is in effect. Only the ordered engine
    /// honors `-1` as "disabled"; an unordered bulk given a negative cap
    /// simply rejects every insert.
    #[must_use]
    pub fn cap_disabled_for_ordered(&self) -> bool {
        self.max_items < 0
    }
}
