//! Rollsim Runner — run orchestration around `rollsim-core`.
//!
//! This crate builds on the core engine to provide:
//! - TOML run configuration with engine defaults
//! - The tick loop and the `Strategy` seam
//! - Deterministic run fingerprinting
//! - CSV/JSON export of the three append-only logs

pub mod config;
pub mod engine;
pub mod fingerprint;
pub mod report;

pub use config::{ConfigError, RunConfig};
pub use engine::{Engine, OrderIntent, RunSummary, Strategy, StrategyContext};
pub use fingerprint::{fingerprint, RunId};
pub use report::{
    export_holdings_csv, export_run, export_trades_csv, export_values_csv, ArtifactPaths,
};
