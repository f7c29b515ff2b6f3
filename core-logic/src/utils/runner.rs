use crate::config::RunnerConfig;
use crate::metrics::{MetricsCollector, TurnOutcome};
use crate::traits::AccountWorker;
use crate::utils::credential_manager::Credential;
use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::signal;
use tracing::{error, info, Instrument};

/// Totals of one pass over the whole roster
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub accounts: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub taps: u64,
    pub coins: u64,
}

/// Walks the account roster one account at a time, forever.
///
/// Account `i + 1` never starts before account `i` has finished, including
/// its error handling. Errors from one account are logged and swallowed.
pub struct RosterRunner {
    config: RunnerConfig,
}

impl RosterRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Runs passes until `max_passes` is reached (never, when `None`) or Ctrl+C.
    pub async fn run(
        &self,
        worker: &dyn AccountWorker,
        credentials: &[Credential],
        max_passes: Option<u64>,
    ) -> Result<()> {
        if credentials.is_empty() {
            anyhow::bail!("No accounts to process");
        }

        tokio::select! {
            _ = self.run_passes(worker, credentials, max_passes) => {
                info!("Finished {} pass(es).", max_passes.unwrap_or_default());
            }
            res = signal::ctrl_c() => {
                match res {
                    Ok(()) => info!("🛑 Received Ctrl+C. Shutting down..."),
                    Err(err) => error!("Unable to listen for shutdown signal: {}", err),
                }
            }
        }

        Ok(())
    }

    async fn run_passes(
        &self,
        worker: &dyn AccountWorker,
        credentials: &[Credential],
        max_passes: Option<u64>,
    ) {
        let mut pass = 0u64;
        loop {
            pass += 1;
            let summary = self.run_pass(worker, credentials).await;
            info!(
                "Pass {} done | Accounts: {} | Completed: {} | Skipped: {} | Failed: {} | Taps: {} | Coins: {}",
                pass,
                summary.accounts,
                summary.completed,
                summary.skipped,
                summary.failed,
                summary.taps,
                summary.coins
            );
            info!("Metrics | {}", MetricsCollector::global().to_compact_json());

            if max_passes.is_some_and(|max| pass >= max) {
                return;
            }

            info!(
                "Wait {} seconds to continue the loop",
                self.config.pass_delay_secs
            );
            tokio::time::sleep(Duration::from_secs(self.config.pass_delay_secs)).await;
        }
    }

    /// One sequential sweep over every account.
    pub async fn run_pass(
        &self,
        worker: &dyn AccountWorker,
        credentials: &[Credential],
    ) -> PassSummary {
        let metrics = MetricsCollector::global();
        let mut summary = PassSummary {
            accounts: credentials.len(),
            ..Default::default()
        };

        for (i, credential) in credentials.iter().enumerate() {
            let name = credential
                .identity()
                .map(|identity| identity.display_name())
                .unwrap_or_else(|_| "unknown".to_string());
            let span = tracing::info_span!(
                "account",
                idx = format!("{:03}", i + 1).as_str(),
                name = name.as_str()
            );

            let started = Instant::now();
            let result = async {
                info!("Account {} | {}", i + 1, name);
                worker.run_account(i, credential).await
            }
            .instrument(span)
            .await;

            match result {
                Ok(stats) => {
                    let outcome = if stats.skipped {
                        summary.skipped += 1;
                        TurnOutcome::Skipped
                    } else {
                        summary.completed += 1;
                        TurnOutcome::Completed
                    };
                    summary.taps += stats.taps;
                    summary.coins += stats.coins;
                    metrics.record_turn(started.elapsed(), outcome, stats.taps, stats.coins);
                }
                Err(e) => {
                    summary.failed += 1;
                    error!("Error processing account {} | {:#}", i + 1, e);
                    metrics.record_turn(started.elapsed(), TurnOutcome::Failed, 0, 0);
                }
            }

            tokio::time::sleep(Duration::from_millis(self.config.account_delay_ms)).await;
        }

        metrics.finish_pass();
        summary
    }
}
