//! Local bookkeeping of one account's game state.

use crate::client::models::UserStats;
use crate::error::{ApiError, ApiResult};

/// Snapshot of the account, refreshed by the start call and patched by every
/// later response. Never written without a server round-trip behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub total_coins: u64,
    pub energy: u64,
    pub max_energy: u64,
    pub tap_unit: u64,
    /// `None` until a response reports it
    pub tap_level: Option<u64>,
    pub energy_level: Option<u64>,
    pub profit_per_second: f64,
}

impl GameState {
    /// Builds a full state from a start-call user block.
    pub fn from_stats(stats: &UserStats) -> ApiResult<Self> {
        let missing: Vec<&str> = [
            ("total_coins", stats.total_coins.is_none()),
            ("energy", stats.energy.is_none()),
            ("max_energy", stats.max_energy.is_none()),
            ("multi_tap_count", stats.tap_unit.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(ApiError::unknown(format!(
                "Missing required properties | {}",
                missing.join(", ")
            )));
        }

        let mut state = GameState::default();
        state.apply(stats);
        Ok(state)
    }

    /// Merges every field the server reported; absent fields keep their value.
    pub fn apply(&mut self, stats: &UserStats) {
        if let Some(coins) = stats.total_coins {
            self.total_coins = coins;
        }
        if let Some(max_energy) = stats.max_energy {
            self.max_energy = max_energy;
        }
        if let Some(unit) = stats.tap_unit {
            self.tap_unit = unit;
        }
        if stats.tap_level.is_some() {
            self.tap_level = stats.tap_level;
        }
        if stats.energy_level.is_some() {
            self.energy_level = stats.energy_level;
        }
        if let Some(profit) = stats.profit_per_second {
            self.profit_per_second = profit;
        }
        if let Some(energy) = stats.energy {
            self.set_energy(energy);
        }
    }

    /// Energy is kept within `[0, max_energy]`.
    pub fn set_energy(&mut self, energy: u64) {
        self.energy = energy.min(self.max_energy);
    }
}
