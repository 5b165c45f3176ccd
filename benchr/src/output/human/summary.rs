use std::fmt::Write as _;
use std::time::Duration;

use benchr_core::RoundReport;

use super::format::format_bytes;

const RULE: &str = "-------------------------------";

pub(crate) fn render(report: &RoundReport) -> String {
    let s = &report.stats;
    let mut out = String::new();

    writeln!(out).ok();
    writeln!(out, "     Benchmark Times({}):", report.round).ok();
    writeln!(out, "{RULE}").ok();
    writeln!(out, "  Connections(Workers): {}", report.workers).ok();
    writeln!(out, "  Success Total: {} reqs", s.success).ok();
    writeln!(out, "  Failure Total: {} reqs", s.failure).ok();
    writeln!(out, "  Success Rate: {}%", report.success_rate()).ok();
    writeln!(out, "  Receive Data: {}", format_bytes(s.total_recv_bytes)).ok();
    writeln!(out, "  Fastest Request: {}ms", s.min_req_elapsed_ms).ok();
    writeln!(out, "  Slowest Request: {}ms", s.max_req_elapsed_ms).ok();
    writeln!(out, "  Average Request Time: {}ms", report.avg_req_ms()).ok();
    writeln!(out, "  Requests/sec: {}", report.requests_per_sec()).ok();
    writeln!(out, "  Transfer/sec: {}", format_bytes(report.transfer_per_sec())).ok();
    writeln!(
        out,
        "  Elapsed: {}",
        humantime::format_duration(Duration::from_millis(report.wall_clock_ms()))
    )
    .ok();
    writeln!(out, "{RULE}").ok();

    for (code, count) in &s.status_counts {
        writeln!(out, "Status {code}: {count} reqs").ok();
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use benchr_core::StatsSnapshot;

    use super::*;

    #[test]
    fn renders_block_and_sorted_histogram() {
        let report = RoundReport {
            round: 2,
            workers: 10,
            stats: StatsSnapshot {
                success: 8,
                failure: 2,
                total_time_ms: 50,
                total_reqs: 10,
                total_recv_bytes: 2048,
                max_req_elapsed_ms: 9,
                min_req_elapsed_ms: 2,
                status_counts: BTreeMap::from([(500, 2), (200, 8)]),
            },
            wall_clock: Duration::from_millis(500),
        };

        let out = render(&report);
        let expected = "
     Benchmark Times(2):
-------------------------------
  Connections(Workers): 10
  Success Total: 8 reqs
  Failure Total: 2 reqs
  Success Rate: 80%
  Receive Data: 2.00KB
  Fastest Request: 2ms
  Slowest Request: 9ms
  Average Request Time: 5ms
  Requests/sec: 20
  Transfer/sec: 4.00KB
  Elapsed: 500ms
-------------------------------
Status 200: 8 reqs
Status 500: 2 reqs
";
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_round_does_not_divide_by_zero() {
        let report = RoundReport {
            round: 1,
            workers: 1,
            stats: StatsSnapshot::default(),
            wall_clock: Duration::ZERO,
        };

        let out = render(&report);
        assert!(out.contains("Success Rate: 0%"));
        assert!(out.contains("Average Request Time: 0ms"));
        assert!(!out.contains("Status "));
    }
}
