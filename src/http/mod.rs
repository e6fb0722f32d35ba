//! HTTP transport
//!
//! A reqwest-based client with retry, backoff and rate limiting. The
//! connector core issues only GET requests; everything beyond the single
//! request (windowing, watermarks) lives in the engine.

mod client;
mod rate_limit;

pub use client::{BackoffType, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
