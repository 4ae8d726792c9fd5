//! Address validation gateway library.

pub mod admin;
pub mod cache;
pub mod config;
pub mod features;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use features::{FeatureFlag, FeatureRegistry};
pub use gateway::{OutcomeStatus, ValidationGateway, ValidationOutcome, ValidationRequest};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
