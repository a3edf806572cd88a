//! Cancellable parallel reduction framework
//!
//! This module owns everything with real concurrency concerns: partitioning the
//! input, the bounded job/result pipeline, worker lifecycle, shutdown ordering
//! and cancellation races.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────┐   jobs (bounded)   ┌──────────┐  results (bounded)
//!  values ──────▶ │  Feeder  │ ─────────────────▶ │ Worker 0 │ ───────┐
//!  partition()    └──────────┘         │          ├──────────┤        │   ┌────────────┐
//!                                      ├────────▶ │ Worker 1 │ ───────┼─▶ │ Aggregator │ ─▶ total
//!                                      │          ├──────────┤        │   └────────────┘
//!                                      └────────▶ │ Worker n │ ───────┘         ▲
//!                                                 └──────────┘                  │
//!                                                      │ all exited             │
//!                                                      └──▶ Completion tracker ─┘ closes results
//! ```
//!
//! Every blocking step (feeding a chunk, waiting for a job, depositing a
//! partial sum, waiting for the next partial sum) is a `crossbeam::select!`
//! against [`CancellationToken::done`], so nothing stays parked once the token
//! fires.
//!
//! The worker count only decides how the input is chunked. At most
//! `DEFAULT_MAX_THREADS` OS threads (or the cap set through
//! `ParallelReducer::with_max_threads`) share the job queue, each pulling
//! chunks until it closes.
//!
//! # Example Usage
//!
//! ```rust
//! use parallel_sum::ReduceConfig;
//! use parallel_sum::parallel::{CancellationToken, ExecutionStrategy, ParallelReducer};
//!
//! let values: Vec<i64> = (1..=1_000).collect();
//!
//! // Explicit engine with a fixed pool size
//! let reducer = ParallelReducer::new(4);
//! let total = reducer
//!     .reduce(&values, &CancellationToken::never(), None::<fn()>)
//!     .unwrap();
//! assert_eq!(total, 500_500);
//!
//! // Threshold-based strategy selection
//! let config = ReduceConfig {
//!     max_threads: 4,
//!     thread_percentage: 100,
//!     min_items_for_parallel: 100,
//! };
//! let strategy = ExecutionStrategy::from_config(&config, values.len());
//! assert!(matches!(strategy, ExecutionStrategy::Parallel { .. }));
//! ```

pub mod cancel;
pub mod core;
pub mod partition;

// Re-export main types for easier access
pub use cancel::CancellationToken;
pub use self::core::{
    DEFAULT_MAX_THREADS, ExecutionStrategy, ParallelReducer, SequentialReducer, reduce_parallel,
    reduce_parallel_cancellable,
};
pub use partition::{clamp_workers, partition};
