use std::collections::BTreeMap;
use std::io::Write as _;
use std::sync::Arc;

use benchr_core::{ProgressFn, ProgressUpdate, RoundReport};
use serde::Serialize;

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn progress(&self) -> Option<ProgressFn> {
        Some(Arc::new(move |u| {
            let line = build_progress_line(&u);
            emit_json_line(&line);
        }))
    }

    fn print_report(&self, report: &RoundReport) -> anyhow::Result<()> {
        let line = build_round_line(report);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonProgressLine {
    pub kind: &'static str,
    pub round: u32,
    pub completed: u64,
    pub total: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRoundLine {
    pub kind: &'static str,
    pub round: u32,
    pub workers: usize,

    pub total_requests: u64,
    pub success: u64,
    pub failure: u64,
    pub success_rate: u64,

    pub bytes_received: u64,
    pub fastest_ms: u64,
    pub slowest_ms: u64,
    pub average_ms: u64,

    pub requests_per_sec: u64,
    pub bytes_received_per_sec: u64,
    pub elapsed_ms: u64,

    /// Keyed by status code; `"0"` counts transport errors.
    pub status_counts: BTreeMap<u16, u64>,
}

fn build_progress_line(u: &ProgressUpdate) -> JsonProgressLine {
    JsonProgressLine {
        kind: "progress",
        round: u.round,
        completed: u.completed,
        total: u.total,
        elapsed_ms: u64::try_from(u.elapsed.as_millis()).unwrap_or(u64::MAX),
    }
}

fn build_round_line(report: &RoundReport) -> JsonRoundLine {
    let s = &report.stats;

    JsonRoundLine {
        kind: "round",
        round: report.round,
        workers: report.workers,

        total_requests: s.total_reqs,
        success: s.success,
        failure: s.failure,
        success_rate: report.success_rate(),

        bytes_received: s.total_recv_bytes,
        fastest_ms: s.min_req_elapsed_ms,
        slowest_ms: s.max_req_elapsed_ms,
        average_ms: report.avg_req_ms(),

        requests_per_sec: report.requests_per_sec(),
        bytes_received_per_sec: report.transfer_per_sec(),
        elapsed_ms: report.wall_clock_ms(),

        status_counts: s.status_counts.clone(),
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}
