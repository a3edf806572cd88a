use super::cancel::CancellationToken;
use super::partition::{clamp_workers, partition};
use crate::config::ReduceConfig;
use crate::error::ReduceError;
use crate::sum::{Summand, sum};
use crossbeam::channel::{Receiver, Sender, bounded};
use crossbeam::select;
use crossbeam::sync::WaitGroup;

/// Upper bound on OS threads one reduction starts, whatever the worker count
pub const DEFAULT_MAX_THREADS: usize = 256;

/// Fan-out/fan-in reduction engine with a fixed pool size.
///
/// Holds no state besides its sizing, so a single reducer can serve any
/// number of concurrent calls.
#[derive(Debug, Clone, Copy)]
pub struct ParallelReducer {
    workers: usize,
    max_threads: usize,
}

/// Everything a worker thread needs, borrowed from the calling frame
struct WorkerContext<'a, T, H> {
    worker_id: usize,
    job_rx: Receiver<&'a [T]>,
    result_tx: Sender<T>,
    cancel: &'a CancellationToken,
    on_before_process: Option<&'a H>,
    // Dropped when the worker exits, by any path
    _running: WaitGroup,
}

impl ParallelReducer {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            max_threads: DEFAULT_MAX_THREADS,
        }
    }

    /// Cap the OS threads backing the pool (at least one).
    ///
    /// The worker count still decides how the input is chunked; a smaller
    /// pool just pulls several chunks per thread.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Sum `values` across the worker pool.
    ///
    /// `on_before_process` runs once per chunk, on the worker that claimed the
    /// chunk, right before that chunk is summed. Calls from different workers
    /// are concurrent and unordered.
    ///
    /// Returns `Err(ReduceError::Cancelled)` as soon as `cancel` is observed at
    /// any blocking point. Partial totals are discarded in that case. A chunk a
    /// worker has already claimed is still summed; only its deposit is skipped.
    ///
    /// At most [`max_threads`](Self::max_threads) worker threads are started.
    /// If the OS refuses to start any of them, the calling thread drains the
    /// job queue itself. All threads are joined before this returns, and a
    /// panic raised by `on_before_process` is resumed on the calling thread.
    pub fn reduce<T, H>(
        &self,
        values: &[T],
        cancel: &CancellationToken,
        on_before_process: Option<H>,
    ) -> Result<T, ReduceError>
    where
        T: Summand,
        H: Fn() + Sync,
    {
        if values.is_empty() {
            return Ok(T::zero());
        }

        let workers = clamp_workers(self.workers, values.len());

        cancel.check()?;

        let chunks = partition(values, workers);
        let job_count = chunks.len();
        let threads = workers.min(self.max_threads);

        tracing::debug!(
            "Parallel reduction: {} items, {} workers on {} threads, {} chunks",
            values.len(),
            workers,
            threads,
            job_count
        );

        // Capacity equals the chunk count so neither side ever waits on space
        let (job_tx, job_rx): (Sender<&[T]>, Receiver<&[T]>) = bounded(job_count);
        let (result_tx, result_rx): (Sender<T>, Receiver<T>) = bounded(job_count);

        let on_before_process = on_before_process.as_ref();
        let running = WaitGroup::new();

        let outcome = crossbeam::thread::scope(|s| {
            let worker_context = |worker_id| WorkerContext {
                worker_id,
                job_rx: job_rx.clone(),
                result_tx: result_tx.clone(),
                cancel,
                on_before_process,
                _running: running.clone(),
            };

            let mut spawned = 0;
            for worker_id in 0..threads {
                let ctx = worker_context(worker_id);
                let spawn = s
                    .builder()
                    .name(format!("parallel-sum-worker-{worker_id}"))
                    .spawn(move |_| ctx.run());

                if let Err(err) = spawn {
                    tracing::warn!(
                        "Started {} of {} worker threads: {}",
                        spawned,
                        threads,
                        err
                    );
                    break;
                }
                spawned += 1;
            }

            // Nothing came up: the calling thread works the queue instead
            let inline_worker = (spawned == 0).then(|| worker_context(0));
            drop(worker_context);

            // Workers hold the only job receivers from here on
            drop(job_rx);

            // Completion tracker: close results once every worker has exited
            s.spawn(move |_| {
                running.wait();
                drop(result_tx);
                tracing::trace!("All workers exited, result queue closed");
            });

            // Feeder: closes the job queue when it returns, on any path
            s.spawn(move |_| feed(chunks, job_tx, cancel));

            if let Some(ctx) = inline_worker {
                ctx.run();
            }

            collect(result_rx, cancel)
        });

        match outcome {
            Ok(result) => {
                if let Err(ref err) = result {
                    tracing::debug!("Parallel reduction stopped: {}", err);
                }
                result
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl<T, H> WorkerContext<'_, T, H>
where
    T: Summand,
    H: Fn() + Sync,
{
    /// Pull chunks until the job queue closes or the token fires
    fn run(self) {
        loop {
            let job = select! {
                recv(self.cancel.done()) -> _ => None,
                recv(self.job_rx) -> job => Some(job),
            };

            let chunk = match job {
                // A cancellation that raced a ready job still wins
                Some(Ok(_)) if self.cancel.is_cancelled() => {
                    tracing::trace!("worker-{}: cancelled with a chunk ready", self.worker_id);
                    return;
                }
                Some(Ok(chunk)) => chunk,
                Some(Err(_)) => {
                    tracing::trace!("worker-{}: job queue closed", self.worker_id);
                    return;
                }
                None => {
                    tracing::trace!("worker-{}: cancelled while waiting for a chunk", self.worker_id);
                    return;
                }
            };

            if let Some(hook) = self.on_before_process {
                hook();
            }

            let partial = sum(chunk);

            let deposited = select! {
                recv(self.cancel.done()) -> _ => false,
                send(self.result_tx, partial) -> sent => sent.is_ok(),
            };

            if !deposited {
                tracing::trace!(
                    "worker-{}: partial sum of {} items dropped",
                    self.worker_id,
                    chunk.len()
                );
                return;
            }
        }
    }
}

fn feed<'a, T>(chunks: Vec<&'a [T]>, job_tx: Sender<&'a [T]>, cancel: &CancellationToken) {
    for chunk in chunks {
        let fed = select! {
            recv(cancel.done()) -> _ => false,
            send(job_tx, chunk) -> sent => sent.is_ok(),
        };

        if !fed {
            tracing::trace!("Feeder stopped, remaining chunks dropped");
            break;
        }
    }
}

fn collect<T: Summand>(
    result_rx: Receiver<T>,
    cancel: &CancellationToken,
) -> Result<T, ReduceError> {
    let mut total = T::zero();

    loop {
        select! {
            recv(cancel.done()) -> _ => return Err(cancel.error()),
            recv(result_rx) -> partial => {
                // A cancellation that raced a ready result still wins
                cancel.check()?;

                match partial {
                    Ok(partial) => total = total.wrapping_add(&partial),
                    Err(_) => return Ok(total),
                }
            }
        }
    }
}

/// Sum `values` on `workers` threads with no cancellation and no hook
pub fn reduce_parallel<T: Summand>(values: &[T], workers: usize) -> T {
    // A token that can never fire leaves no error path
    ParallelReducer::new(workers)
        .reduce(values, &CancellationToken::never(), None::<fn()>)
        .unwrap_or_else(|_| T::zero())
}

/// Sum `values` on `workers` threads, honoring `cancel` and calling
/// `on_before_process` before each chunk is summed
pub fn reduce_parallel_cancellable<T, H>(
    values: &[T],
    workers: usize,
    cancel: &CancellationToken,
    on_before_process: Option<H>,
) -> Result<T, ReduceError>
where
    T: Summand,
    H: Fn() + Sync,
{
    ParallelReducer::new(workers).reduce(values, cancel, on_before_process)
}

/// Sequential execution strategy for small inputs and comparison
pub struct SequentialReducer;

impl SequentialReducer {
    /// Single-chunk reduction on the calling thread.
    ///
    /// The token is only checked once, up front. The hook runs once, before
    /// the sum, as if the whole slice were a single chunk.
    pub fn reduce<T, H>(
        values: &[T],
        cancel: &CancellationToken,
        on_before_process: Option<H>,
    ) -> Result<T, ReduceError>
    where
        T: Summand,
        H: Fn(),
    {
        if values.is_empty() {
            return Ok(T::zero());
        }

        cancel.check()?;

        if let Some(hook) = on_before_process {
            hook();
        }

        Ok(sum(values))
    }
}

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    pub fn reduce<T, H>(
        &self,
        values: &[T],
        cancel: &CancellationToken,
        on_before_process: Option<H>,
    ) -> Result<T, ReduceError>
    where
        T: Summand,
        H: Fn() + Sync,
    {
        match self {
            ExecutionStrategy::Sequential => {
                SequentialReducer::reduce(values, cancel, on_before_process)
            }
            ExecutionStrategy::Parallel { workers } => {
                ParallelReducer::new(*workers).reduce(values, cancel, on_before_process)
            }
        }
    }

    /// Pick a strategy for `item_count` items from loaded configuration.
    ///
    /// Inputs below `min_items_for_parallel` stay on the calling thread;
    /// anything larger gets the configured worker budget.
    ///
    /// ```rust
    /// use parallel_sum::{ExecutionStrategy, ReduceConfig};
    ///
    /// let config = ReduceConfig {
    ///     max_threads: 4,
    ///     thread_percentage: 100,
    ///     min_items_for_parallel: 50,
    /// };
    /// assert_eq!(ExecutionStrategy::from_config(&config, 36), ExecutionStrategy::Sequential);
    /// assert!(matches!(
    ///     ExecutionStrategy::from_config(&config, 100),
    ///     ExecutionStrategy::Parallel { .. }
    /// ));
    /// ```
    pub fn from_config(config: &ReduceConfig, item_count: usize) -> Self {
        let strategy = if item_count < config.min_items_for_parallel {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel {
                workers: config.worker_budget(),
            }
        };

        tracing::debug!("Strategy for {} items: {:?}", item_count, strategy);
        strategy
    }
}
