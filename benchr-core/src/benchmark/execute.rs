use std::sync::Arc;
use std::time::Instant;

use crate::hooks::RequestHooks;
use crate::http::HttpClient;
use crate::input::RequestSpec;
use crate::stats::{Stats, TRANSPORT_ERROR_STATUS};
use crate::wait_group::WaitGroupGuard;

/// Everything a worker needs to run one request of a round.
pub struct BenchmarkContext {
    pub client: HttpClient,
    pub hooks: Arc<dyn RequestHooks>,
    pub stats: Arc<Stats>,
}

/// Argument bundle for one submission. Dropping it completes the round's wait group entry.
pub struct BenchJob {
    spec: Arc<RequestSpec>,
    ctx: Arc<BenchmarkContext>,
    _done: WaitGroupGuard,
}

impl BenchJob {
    pub fn new(spec: Arc<RequestSpec>, ctx: Arc<BenchmarkContext>, done: WaitGroupGuard) -> Self {
        Self {
            spec,
            ctx,
            _done: done,
        }
    }
}

/// Runs one request end to end and folds the outcome into the round's [`Stats`].
pub async fn execute_request(job: BenchJob) {
    let BenchJob { spec, ctx, _done } = job;
    let stats = &ctx.stats;

    let mut opts = spec.to_options();
    if !ctx.hooks.before_request(&mut opts) {
        stats.add_total_reqs();
        stats.add_failure();
        tracing::error!(url = opts.url(), "request rejected by script");
        return;
    }

    let started = Instant::now();
    let res = ctx.client.execute(&opts).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis())
        .unwrap_or(u64::MAX)
        .max(1);

    stats.add_total_time(elapsed_ms);
    stats.add_total_reqs();

    let res = match res {
        Ok(res) => res,
        Err(err) => {
            stats.add_status_count(TRANSPORT_ERROR_STATUS);
            stats.add_failure();
            tracing::error!(
                url = opts.url(),
                kind = %err.transport_error_kind(),
                error = %err,
                "request failed"
            );
            return;
        }
    };

    stats.add_status_count(res.status);
    if res.status != 200 {
        stats.add_failure();
        tracing::debug!(url = opts.url(), status = res.status, "non-200 response");
        return;
    }

    stats.add_total_recv_bytes(res.body.len() as u64);
    stats.update_req_elapsed(elapsed_ms);

    if !ctx.hooks.check_response(&res.body) {
        stats.add_failure();
        tracing::error!(
            url = opts.url(),
            body = %String::from_utf8_lossy(&res.body),
            "response rejected by script"
        );
        return;
    }

    stats.add_success();
}
