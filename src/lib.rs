//! Omega Analyst - LLM market commentary for the trading desk dashboard
//!
//! This library resolves a Groq API key, turns market snapshots into
//! summary, regime, risk and trade-level prompts, and decodes the model's
//! JSON answers into typed results.

pub mod analyst;
pub mod api;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod llm;
pub mod snapshot;
pub mod tasks;

// Re-export commonly used types
pub use analyst::{get_market_analyst, AnalystFactory, AnalystHandle, AnalystResponse, MarketAnalyst};
pub use config::{AnalystConfig, AppConfig};
pub use error::AnalystError;
pub use snapshot::MarketSnapshot;

#[cfg(test)]
mod credentials_tests;
