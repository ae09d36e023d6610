pub mod benchmarking;
pub mod config;
pub mod error;
pub mod normalization;
pub mod peers;
pub mod population;
pub mod statistics;
pub mod store;
pub mod types;

#[cfg(feature = "savings")]
pub mod savings;

#[cfg(feature = "leaderboard")]
pub mod leaderboard;

pub use error::BenchmarkError;
pub use types::*;

/// Standard result type for all benchmarking operations
pub type BenchmarkResult<T> = Result<T, BenchmarkError>;
