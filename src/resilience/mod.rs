//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to validator:
//!     → timeouts.rs (count request, pick the injected wait hint)
//!     → quota.rs (fixed window admission)
//!     → concurrency.rs (non-blocking in-flight permit)
//!     → upstream call bounded by timeouts::upstream_bound
//! ```
//!
//! # Design Decisions
//! - Every limiter is gated by its feature flag and is a pass-through when off
//! - Rejections never block; callers are told to back off instead
//! - No retries; a failed upstream call is reported once

pub mod concurrency;
pub mod quota;
pub mod timeouts;
