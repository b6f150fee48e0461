//! Provider rate limiting and service configuration.
//!
//! Every upstream client owns a [`RateLimiter`] built from its
//! [`ProviderConfig`]. The limiter enforces a requests-per-minute quota and
//! a concurrency cap, bounds each attempt with a deadline and retries
//! transient failures with jittered exponential backoff.
//!
//! [`TaleweaverConfig`] loads the layered service configuration.

mod config;
mod limiter;

pub use config::{
    FeatureFlags, PipelineConfig, ProviderConfig, ProvidersConfig, ServerConfig, StorageConfig,
    TaleweaverConfig, VoicesConfig,
};
pub use limiter::{ProviderLimits, RateLimiter, RateLimiterGuard};
