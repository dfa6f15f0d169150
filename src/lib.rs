#![forbid(unsafe_code)]

//! An in-memory, TTL-based, hierarchically grouped cache: items are opaque
//! byte payloads grouped into named "bulks", which are themselves grouped
//! into a single process-wide [`Container`].
//!
//! The storage/eviction core lives in [`bulk`] and [`container`]; the
//! [`dage`] and [`http_api`] modules are thin adapters over the container's
//! public API and the only parts of this crate aware of the network.

pub mod analytics;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod container;
pub mod dage;
pub mod errors;
pub mod http_api;
pub mod item;
pub mod key;
pub mod logging;

pub use bulk::{Bulk, BulkConfig, EngineKind};
pub use container::Container;
pub use errors::CacheError;
pub use item::Item;
pub use key::SubKey;
