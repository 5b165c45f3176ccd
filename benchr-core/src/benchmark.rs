mod execute;
mod progress;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;

use crate::Result;
use crate::hooks::RequestHooks;
use crate::http::HttpClient;
use crate::input::{RequestSpec, planned_requests};
use crate::pool::{WorkFn, WorkerPool, work_fn};
use crate::report::RoundReport;
use crate::stats::Stats;
use crate::wait_group::WaitGroup;

pub use execute::{BenchJob, BenchmarkContext, execute_request};
pub use progress::{ProgressFn, ProgressUpdate};

const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// Drives benchmark rounds over one long-lived worker pool.
pub struct Benchmark {
    pool: WorkerPool<BenchJob, ()>,
    func: WorkFn<BenchJob, ()>,
    client: HttpClient,
    hooks: Arc<dyn RequestHooks>,
    rounds: u32,
}

impl Benchmark {
    /// Must be called inside a Tokio runtime; `pool_size` must be positive.
    pub fn new(pool_size: usize, client: HttpClient, hooks: Arc<dyn RequestHooks>) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(pool_size)?,
            func: work_fn(execute_request),
            client,
            hooks,
            rounds: 0,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Submits every planned request of `specs` and waits for all of them to finish.
    ///
    /// Each round starts from fresh statistics. `progress` is called every 200ms while the round
    /// runs and once more when it completes.
    pub async fn run_round(
        &mut self,
        specs: &[RequestSpec],
        progress: Option<ProgressFn>,
    ) -> RoundReport {
        self.rounds += 1;
        let round = self.rounds;
        let total = planned_requests(specs);

        let stats = Arc::new(Stats::new());
        let ctx = Arc::new(BenchmarkContext {
            client: self.client.clone(),
            hooks: self.hooks.clone(),
            stats: stats.clone(),
        });
        let wg = WaitGroup::new();

        tracing::debug!(round, total, workers = self.workers(), "round started");
        let started = Instant::now();

        for spec in specs {
            let spec = Arc::new(spec.clone());
            for _ in 0..spec.times() {
                let job = BenchJob::new(spec.clone(), ctx.clone(), wg.guard());
                // Outcomes land in `stats`; nothing comes back on the result channel.
                drop(self.pool.submit(self.func.clone(), job));
            }
        }
        drop(ctx);

        match progress {
            None => wg.wait().await,
            Some(progress) => {
                let emit = |elapsed| {
                    progress(ProgressUpdate {
                        round,
                        completed: stats.completed(),
                        total,
                        elapsed,
                    });
                };

                let done = wg.wait();
                tokio::pin!(done);
                let mut tick = tokio::time::interval(PROGRESS_TICK);
                tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        () = &mut done => break,
                        _ = tick.tick() => emit(started.elapsed()),
                    }
                }
                emit(started.elapsed());
            }
        }

        let wall_clock = started.elapsed();
        tracing::debug!(round, elapsed = ?wall_clock, "round finished");

        RoundReport {
            round,
            workers: self.workers(),
            stats: stats.snapshot(),
            wall_clock,
        }
    }

    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}
