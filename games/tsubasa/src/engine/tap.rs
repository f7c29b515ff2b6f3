//! Energy drain loop.
//!
//! The engine moves through four phases:
//!
//! - `Tapping`: spend `floor(energy / tap_unit)` taps in one call, retrying a
//!   failed call a bounded number of times.
//! - `Verifying`: make sure the reported energy actually dropped. If it did
//!   not, refetch the state once; if the refetch still shows no drop the
//!   engine stops with [`TapStop::SyncFailure`].
//! - `Recovering`: once energy is down to a single tap unit, ask for a full
//!   refill. Anything less than a full refill stops the engine.
//! - `Stopped`: terminal; the reason is reported in [`TapReport`].
//!
//! The engine never fails: every outcome ends up in the report.

use crate::client::models::UserStats;
use crate::client::GameClient;
use crate::error::ApiError;
use crate::session::AccountSession;
use crate::state::GameState;
use core_logic::{retry_if, RetryConfig};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Why the engine stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapStop {
    /// Less than one tap unit of energy left and no refill attempted
    OutOfEnergy,
    /// The server reports a tap unit of zero
    NoTapUnit,
    /// The tap call failed on every allowed attempt
    TapFailed,
    /// Energy did not drop after a tap, even after a refetch
    SyncFailure,
    /// The refill did not bring energy back to the maximum
    RecoveryIncomplete { energy: u64, max_energy: u64 },
    RecoveryFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapReport {
    pub taps: u64,
    pub stop: TapStop,
    pub energy: u64,
}

/// Number of tap actions `energy` pays for.
pub fn tap_count(energy: u64, tap_unit: u64) -> u64 {
    if tap_unit == 0 {
        0
    } else {
        energy / tap_unit
    }
}

enum Phase {
    Tapping,
    Verifying {
        before: u64,
        count: u64,
        reported: UserStats,
    },
    Recovering,
    Stopped(TapStop),
}

pub struct TapEngine<'a> {
    client: &'a GameClient,
}

impl<'a> TapEngine<'a> {
    pub fn new(client: &'a GameClient) -> Self {
        Self { client }
    }

    pub async fn run(&self, session: &AccountSession, state: &mut GameState) -> TapReport {
        let mut taps = 0u64;
        let mut phase = Phase::Tapping;

        loop {
            phase = match phase {
                Phase::Tapping => self.tap(session, state).await,
                Phase::Verifying {
                    before,
                    count,
                    reported,
                } => match self.verify(session, state, before, &reported).await {
                    Some(stop) => Phase::Stopped(stop),
                    None => {
                        taps += count;
                        info!(
                            "Tap successful | Taps: {} | Energy: {}/{} | Balance: {}",
                            count, state.energy, state.max_energy, state.total_coins
                        );
                        if state.energy <= state.tap_unit {
                            Phase::Recovering
                        } else {
                            Phase::Tapping
                        }
                    }
                },
                Phase::Recovering => self.recover(session, state).await,
                Phase::Stopped(stop) => {
                    debug!("Tap engine stopped | {:?} | Total taps: {}", stop, taps);
                    return TapReport {
                        taps,
                        stop,
                        energy: state.energy,
                    };
                }
            };
        }
    }

    async fn tap(&self, session: &AccountSession, state: &GameState) -> Phase {
        if state.tap_unit == 0 {
            warn!("Tap unit is zero. Skipping taps.");
            return Phase::Stopped(TapStop::NoTapUnit);
        }

        let count = tap_count(state.energy, state.tap_unit);
        if count == 0 {
            info!("Not enough energy to tap | Energy: {}", state.energy);
            return Phase::Stopped(TapStop::OutOfEnergy);
        }

        let timing = self.client.timing();
        let policy = RetryConfig::fixed(
            timing.max_tap_failures.saturating_sub(1),
            timing.tap_retry_delay_ms,
        );
        let client = self.client;

        match retry_if(
            policy,
            "Tap",
            move || client.tap(session, count),
            |_: &ApiError| true,
        )
        .await
        {
            Ok(reported) => Phase::Verifying {
                before: state.energy,
                count,
                reported,
            },
            Err(e) => {
                error!(
                    "Tap failed {} times in a row | {}. Stopping taps.",
                    timing.max_tap_failures, e.message
                );
                Phase::Stopped(TapStop::TapFailed)
            }
        }
    }

    /// Accepts the tap result into `state`, or returns why it could not.
    async fn verify(
        &self,
        session: &AccountSession,
        state: &mut GameState,
        before: u64,
        reported: &UserStats,
    ) -> Option<TapStop> {
        let reported_energy = reported.energy.unwrap_or(before);
        if reported_energy < before {
            state.apply(reported);
            return None;
        }

        warn!(
            "Energy did not decrease after tap | Before: {} | Reported: {}. Re-syncing state.",
            before, reported_energy
        );

        match self.client.fetch_state(session).await {
            Ok(fresh) if fresh.state.energy < before => {
                *state = fresh.state;
                None
            }
            Ok(fresh) => {
                error!(
                    "Energy still not decreasing | Before: {} | Current: {}. Stopping taps.",
                    before, fresh.state.energy
                );
                Some(TapStop::SyncFailure)
            }
            Err(e) => {
                error!("Failed to re-sync state | {}. Stopping taps.", e.message);
                Some(TapStop::SyncFailure)
            }
        }
    }

    async fn recover(&self, session: &AccountSession, state: &mut GameState) -> Phase {
        let delay = self.client.timing().recovery_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        match self.client.recover_energy(session).await {
            Ok(snapshot) => {
                state.max_energy = snapshot.max_energy;
                state.set_energy(snapshot.energy);

                if snapshot.energy == snapshot.max_energy {
                    info!(
                        "Energy recovered successfully | Energy: {}/{}",
                        snapshot.energy, snapshot.max_energy
                    );
                    Phase::Tapping
                } else {
                    warn!(
                        "Energy recovery incomplete | Energy: {}/{}. Recovery not ready yet.",
                        snapshot.energy, snapshot.max_energy
                    );
                    Phase::Stopped(TapStop::RecoveryIncomplete {
                        energy: snapshot.energy,
                        max_energy: snapshot.max_energy,
                    })
                }
            }
            Err(e) => {
                warn!("Energy recovery failed | {}", e.message);
                Phase::Stopped(TapStop::RecoveryFailed)
            }
        }
    }
}
