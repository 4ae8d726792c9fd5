//! Downstream validator integration.
//!
//! # Data Flow
//! ```text
//! Gateway (admitted request)
//!     → client.rs DependencyClient (bound + wait hint)
//!     → AddressValidator impl (HttpValidator in production)
//!     → POST {base_url}/validate[?wait=N]
//!     → DependencyResult (success / timeout / failed)
//! ```
//!
//! # Design Decisions
//! - Fail fast: no retries on any upstream failure
//! - Timeouts are distinct from other transport errors
//! - The transport is a trait so tests swap in local validators
//! - provider.rs is a stand-in upstream for local runs and tests

pub mod client;
pub mod provider;
pub mod types;

pub use client::{AddressValidator, DependencyClient, DependencyResult, HttpValidator};
pub use types::{UpstreamError, ValidateRequest, ValidationResponse};
