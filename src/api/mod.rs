//! Remote image operations
//!
//! Everything that talks to the generative-image service lives here:
//! - The `RemoteImageOp` trait the batch runner is written against
//! - The reqwest-backed `GeminiImageClient` implementation (client.rs)
//! - Configuration read from the environment (config.rs)

pub mod client;
pub mod config;

pub use client::{ApiError, GeminiImageClient, RemoteImageOp};
pub use config::ApiConfig;
