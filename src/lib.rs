//! # parallel-sum - Cancellable Fan-Out/Fan-In Summation
//!
//! Sums slices of fixed-width signed integers either sequentially or by
//! spreading contiguous chunks across a fixed pool of worker threads and
//! folding their partial sums back together.
//!
//! ## Features
//!
//! - **Windowed partitioning**: full-size leading chunks, shorter final chunk
//! - **Bounded pipelines**: crossbeam job and result channels sized to the chunk count
//! - **Cooperative cancellation**: every blocking point races a [`CancellationToken`]
//! - **Observation hook**: optional callback run by each worker before it sums its chunk
//! - **Resource-aware strategy**: sequential vs parallel selection driven by [`ReduceConfig`]
//!
//! ## Quick Start
//!
//! ```rust
//! use parallel_sum::{reduce_parallel, reduce_parallel_cancellable, CancellationToken};
//!
//! let values: Vec<i64> = (1..=100).collect();
//! assert_eq!(reduce_parallel(&values, 8), 5050);
//!
//! let token = CancellationToken::new();
//! token.cancel();
//! assert!(reduce_parallel_cancellable(&values, 8, &token, None::<fn()>).is_err());
//! ```

pub mod config;
pub mod error;
pub mod parallel;
pub mod sum;

pub use config::ReduceConfig;
pub use error::{CancelCause, ReduceError};
pub use parallel::{
    CancellationToken, DEFAULT_MAX_THREADS, ExecutionStrategy, ParallelReducer, clamp_workers, partition,
    reduce_parallel, reduce_parallel_cancellable,
};
pub use sum::{Summand, sum};

/// Result type alias for configuration and setup operations
pub type Result<T> = anyhow::Result<T>;
