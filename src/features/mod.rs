//! Feature toggle subsystem.
//!
//! # Data Flow
//! ```text
//! Control plane (POST /toggle-feature, config reload)
//!     → registry.rs (atomic flag flip)
//!
//! Every request:
//!     → registry.rs (lock-free read per policy)
//!     → quota / input / cache / concurrency / timeouts stages
//! ```
//!
//! # Design Decisions
//! - Fixed set of flags, unknown names never become flags
//! - One atomic per flag: a flip is visible to the next check
//! - All flags start disabled unless configuration says otherwise

pub mod registry;

pub use registry::{FeatureFlag, FeatureRegistry};
