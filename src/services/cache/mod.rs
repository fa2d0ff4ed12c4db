//! Short-lived key/value cache (Valkey) used by the role lookup.
mod store;
mod valkey;

pub use store::{CacheError, CacheStore};
pub use valkey::ValkeyStore;
