//! Interview service HTTP adapter

mod client;
mod retry;

pub use client::HttpApiClient;
pub use retry::RetryPolicy;
