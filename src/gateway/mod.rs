//! Validation gateway: the per-request policy pipeline.
//!
//! # Data Flow
//! ```text
//! ValidationRequest
//!     → timeouts (count request, pick wait hint)
//!     → quota        ── rejected_quota (429)
//!     → input        ── rejected_input (400)
//!     → cache        ── hit: success, sourced_from_cache
//!     → concurrency  ── rejected_concurrency (429)
//!     → upstream     ── rejected_timeout (400) / failure (500)
//!     → cache store
//!     → success (200)
//! ```
//!
//! # Design Decisions
//! - Stage order is fixed; flags only switch stages on or off
//! - First rejection wins; later stages never see the request
//! - Every path ends in exactly one `ValidationOutcome`

pub mod input;
pub mod outcome;
pub mod pipeline;

pub use input::{InputPolicy, InputRejection};
pub use outcome::{OutcomeStatus, ValidationOutcome};
pub use pipeline::{GatewayError, GatewayStats, ValidationGateway, ValidationRequest};
