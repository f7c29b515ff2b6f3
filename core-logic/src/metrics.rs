use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_secs: u64,
    pub accounts: AccountMetrics,
    pub game: GameMetrics,
    pub calls: CallMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountMetrics {
    pub turns: u64,
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub passes: u64,
    pub avg_turn_duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameMetrics {
    pub total_taps: u64,
    /// Coin tally of the most recent turn of each account, summed per pass
    pub last_pass_coins: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallMetrics {
    pub total_calls: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

#[derive(Debug)]
pub struct MetricsCollector {
    turns_total: AtomicU64,
    turns_completed: AtomicU64,
    turns_skipped: AtomicU64,
    turns_failed: AtomicU64,
    turn_duration_sum_ms: AtomicU64,
    passes: AtomicU64,
    taps_total: AtomicU64,
    pass_coins: AtomicU64,
    last_pass_coins: AtomicU64,
    calls: AtomicU64,
    call_latency_sum_ms: AtomicU64,
    call_min_latency_ms: AtomicU64,
    call_max_latency_ms: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            turns_total: AtomicU64::new(0),
            turns_completed: AtomicU64::new(0),
            turns_skipped: AtomicU64::new(0),
            turns_failed: AtomicU64::new(0),
            turn_duration_sum_ms: AtomicU64::new(0),
            passes: AtomicU64::new(0),
            taps_total: AtomicU64::new(0),
            pass_coins: AtomicU64::new(0),
            last_pass_coins: AtomicU64::new(0),
            calls: AtomicU64::new(0),
            call_latency_sum_ms: AtomicU64::new(0),
            call_min_latency_ms: AtomicU64::new(u64::MAX),
            call_max_latency_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

/// How an account turn ended, as far as metrics care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Skipped,
    Failed,
}

impl MetricsCollector {
    pub fn global() -> &'static Self {
        static INSTANCE: std::sync::OnceLock<MetricsCollector> = std::sync::OnceLock::new();
        INSTANCE.get_or_init(MetricsCollector::default)
    }

    pub fn record_turn(&self, duration: Duration, outcome: TurnOutcome, taps: u64, coins: u64) {
        self.turns_total.fetch_add(1, Ordering::SeqCst);
        self.turn_duration_sum_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);

        let counter = match outcome {
            TurnOutcome::Completed => &self.turns_completed,
            TurnOutcome::Skipped => &self.turns_skipped,
            TurnOutcome::Failed => &self.turns_failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        self.taps_total.fetch_add(taps, Ordering::SeqCst);
        self.pass_coins.fetch_add(coins, Ordering::SeqCst);
    }

    /// Closes the current pass: the running coin sum becomes `last_pass_coins`.
    pub fn finish_pass(&self) {
        self.passes.fetch_add(1, Ordering::SeqCst);
        let coins = self.pass_coins.swap(0, Ordering::SeqCst);
        self.last_pass_coins.store(coins, Ordering::SeqCst);
    }

    pub fn record_call_latency(&self, latency: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_latency_sum_ms
            .fetch_add(latency.as_millis() as u64, Ordering::SeqCst);

        let latency_ms = latency.as_millis() as u64;
        self.call_min_latency_ms
            .fetch_min(latency_ms, Ordering::SeqCst);
        self.call_max_latency_ms
            .fetch_max(latency_ms, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let turns = self.turns_total.load(Ordering::SeqCst);
        let duration_sum = self.turn_duration_sum_ms.load(Ordering::SeqCst);

        let calls = self.calls.load(Ordering::SeqCst);
        let latency_sum = self.call_latency_sum_ms.load(Ordering::SeqCst);
        let min_latency = self.call_min_latency_ms.load(Ordering::SeqCst);

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            uptime_secs: self.uptime().as_secs(),
            accounts: AccountMetrics {
                turns,
                completed: self.turns_completed.load(Ordering::SeqCst),
                skipped: self.turns_skipped.load(Ordering::SeqCst),
                failed: self.turns_failed.load(Ordering::SeqCst),
                passes: self.passes.load(Ordering::SeqCst),
                avg_turn_duration_ms: if turns > 0 {
                    duration_sum as f64 / turns as f64
                } else {
                    0.0
                },
            },
            game: GameMetrics {
                total_taps: self.taps_total.load(Ordering::SeqCst),
                last_pass_coins: self.last_pass_coins.load(Ordering::SeqCst),
            },
            calls: CallMetrics {
                total_calls: calls,
                avg_latency_ms: if calls > 0 {
                    latency_sum as f64 / calls as f64
                } else {
                    0.0
                },
                min_latency_ms: if min_latency == u64::MAX {
                    0
                } else {
                    min_latency
                },
                max_latency_ms: self.call_max_latency_ms.load(Ordering::SeqCst),
            },
        }
    }

    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_compact_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json();
        tokio::fs::write(path, json).await
    }

    pub fn turns_total(&self) -> u64 {
        self.turns_total.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let metrics = MetricsCollector::default();

        metrics.record_turn(Duration::from_millis(100), TurnOutcome::Completed, 40, 1000);
        metrics.record_turn(Duration::from_millis(200), TurnOutcome::Skipped, 0, 0);
        metrics.record_turn(Duration::from_millis(300), TurnOutcome::Failed, 5, 250);

        assert_eq!(metrics.turns_total(), 3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.accounts.completed, 1);
        assert_eq!(snapshot.accounts.skipped, 1);
        assert_eq!(snapshot.accounts.failed, 1);
        assert_eq!(snapshot.game.total_taps, 45);
        assert!((snapshot.accounts.avg_turn_duration_ms - 200.0).abs() < 0.1);
    }

    #[test]
    fn test_finish_pass_rolls_coin_sum() {
        let metrics = MetricsCollector::default();
        metrics.record_turn(Duration::ZERO, TurnOutcome::Completed, 0, 700);
        metrics.finish_pass();
        metrics.record_turn(Duration::ZERO, TurnOutcome::Completed, 0, 50);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.accounts.passes, 1);
        assert_eq!(snapshot.game.last_pass_coins, 700);
    }

    #[tokio::test]
    async fn test_json_export() {
        let metrics = MetricsCollector::default();
        metrics.record_call_latency(Duration::from_millis(12));

        let json = metrics.to_json();
        assert!(json.contains("accounts"));
        assert!(json.contains("calls"));
    }
}
