//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted request (efficiency on):
//!     → response.rs lookup (hit → answer without calling upstream)
//!     → upstream call
//!     → response.rs store (successful responses only)
//! ```
//!
//! # Design Decisions
//! - Keyed by the exact address string as received
//! - No eviction and no TTL; entries live until cleared
//! - No single-flight: two concurrent misses for one key both go upstream

pub mod response;

pub use response::{CacheEntry, ResponseCache};
