//! Configuration management for parallel-sum
//!
//! Settings only influence how many workers a reduction uses and when the
//! sequential path is preferred. They are layered with figment, lowest
//! priority first:
//!
//! 1. Embedded `default-config.toml`
//! 2. `parallel-sum.toml` in the working directory, or an explicit file
//! 3. `PARALLEL_SUM_*` environment variables

pub mod core;

pub use self::core::ReduceConfig;

#[cfg(test)]
mod tests;
