use std::time::Duration;

use crate::stats::StatsSnapshot;

/// Results of one benchmark round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// 1-based.
    pub round: u32,
    pub workers: usize,
    pub stats: StatsSnapshot,
    pub wall_clock: Duration,
}

impl RoundReport {
    /// Round duration in whole milliseconds, at least 1.
    pub fn wall_clock_ms(&self) -> u64 {
        u64::try_from(self.wall_clock.as_millis())
            .unwrap_or(u64::MAX)
            .max(1)
    }

    fn total_reqs_clamped(&self) -> u64 {
        self.stats.total_reqs.max(1)
    }

    /// Integer percentage of successful requests.
    pub fn success_rate(&self) -> u64 {
        self.stats.success.saturating_mul(100) / self.total_reqs_clamped()
    }

    pub fn avg_req_ms(&self) -> u64 {
        self.stats.total_time_ms / self.total_reqs_clamped()
    }

    pub fn requests_per_sec(&self) -> u64 {
        self.stats.total_reqs.saturating_mul(1000) / self.wall_clock_ms()
    }

    pub fn transfer_per_sec(&self) -> u64 {
        self.stats.total_recv_bytes.saturating_mul(1000) / self.wall_clock_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(stats: StatsSnapshot, wall_clock: Duration) -> RoundReport {
        RoundReport {
            round: 1,
            workers: 4,
            stats,
            wall_clock,
        }
    }

    #[test]
    fn empty_round_has_zero_metrics() {
        let r = report(StatsSnapshot::default(), Duration::ZERO);
        assert_eq!(r.wall_clock_ms(), 1);
        assert_eq!(r.success_rate(), 0);
        assert_eq!(r.avg_req_ms(), 0);
        assert_eq!(r.requests_per_sec(), 0);
        assert_eq!(r.transfer_per_sec(), 0);
    }

    #[test]
    fn derived_metrics() {
        let stats = StatsSnapshot {
            success: 3,
            failure: 1,
            total_reqs: 4,
            total_time_ms: 100,
            total_recv_bytes: 2048,
            ..Default::default()
        };
        let r = report(stats, Duration::from_millis(500));

        assert_eq!(r.success_rate(), 75);
        assert_eq!(r.avg_req_ms(), 25);
        assert_eq!(r.requests_per_sec(), 8);
        assert_eq!(r.transfer_per_sec(), 4096);
    }
}
