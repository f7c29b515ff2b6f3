use crate::client::models::UserStats;
use crate::client::GameClient;
use crate::config::UpgradeBudget;
use crate::session::AccountSession;
use crate::state::GameState;
use tracing::{info, warn};

/// Stats that can be bought with coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Tap,
    Energy,
}

impl Stat {
    pub fn label(self) -> &'static str {
        match self {
            Stat::Tap => "Tap",
            Stat::Energy => "Energy",
        }
    }

    /// Wire name of the level field
    fn field(self) -> &'static str {
        match self {
            Stat::Tap => "tap_level",
            Stat::Energy => "energy_level",
        }
    }

    fn level(self, state: &GameState) -> Option<u64> {
        match self {
            Stat::Tap => state.tap_level,
            Stat::Energy => state.energy_level,
        }
    }

    fn max_level(self, budget: &UpgradeBudget) -> u64 {
        match self {
            Stat::Tap => budget.max_tap_level,
            Stat::Energy => budget.max_energy_level,
        }
    }

    fn reported_level(self, stats: &UserStats) -> Option<u64> {
        match self {
            Stat::Tap => stats.tap_level,
            Stat::Energy => stats.energy_level,
        }
    }
}

/// Price of the next level when the stat sits at `level`.
pub fn upgrade_cost(level: u64) -> u64 {
    level.saturating_mul(1000)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReport {
    pub stat: Stat,
    pub purchases: u64,
    pub level: Option<u64>,
    pub coins: u64,
}

/// Buys levels of one stat while the level cap, the balance and the
/// per-purchase cost cap all allow it. The first failed purchase ends the
/// run for this turn.
pub struct UpgradeScheduler<'a> {
    client: &'a GameClient,
    budget: UpgradeBudget,
}

impl<'a> UpgradeScheduler<'a> {
    pub fn new(client: &'a GameClient, budget: UpgradeBudget) -> Self {
        Self { client, budget }
    }

    fn affordable(&self, stat: Stat, level: u64, coins: u64) -> bool {
        let cost = upgrade_cost(level);
        level < stat.max_level(&self.budget) && coins >= cost && cost <= self.budget.max_upgrade_cost
    }

    /// A stat whose level is unknown is never priced, so nothing is bought.
    pub async fn run(
        &self,
        session: &AccountSession,
        state: &mut GameState,
        stat: Stat,
    ) -> UpgradeReport {
        let mut purchases = 0;

        let Some(mut level) = stat.level(state) else {
            warn!(
                "Missing required properties | {}. Skipping {} upgrades.",
                stat.field(),
                stat.label().to_lowercase()
            );
            return UpgradeReport {
                stat,
                purchases,
                level: None,
                coins: state.total_coins,
            };
        };

        while self.affordable(stat, level, state.total_coins) {
            match self.client.level_up(session, stat).await {
                Ok(stats) => {
                    state.apply(&stats);

                    let Some(new_level) = stat.reported_level(&stats) else {
                        warn!(
                            "Malformed {} upgrade response | no {} reported. Stopping {} upgrades.",
                            stat.label().to_lowercase(),
                            stat.field(),
                            stat.label().to_lowercase()
                        );
                        break;
                    };
                    purchases += 1;

                    info!(
                        "{} upgraded successfully | Level: {} | Balance: {}",
                        stat.label(),
                        new_level,
                        state.total_coins
                    );

                    if new_level <= level {
                        warn!(
                            "{} level did not advance past {}. Stopping {} upgrades.",
                            stat.label(),
                            level,
                            stat.label().to_lowercase()
                        );
                        break;
                    }
                    level = new_level;
                }
                Err(e) => {
                    warn!("{} upgrade failed | {}", stat.label(), e.message);
                    break;
                }
            }
        }

        UpgradeReport {
            stat,
            purchases,
            level: stat.level(state),
            coins: state.total_coins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ENERGY_LEVELUP, TAP_LEVELUP};
    use crate::config::TimingConfig;
    use crate::test_support::{self, ScriptedTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn state(coins: u64, tap_level: u64, energy_level: u64) -> GameState {
        GameState {
            total_coins: coins,
            energy: 0,
            max_energy: 100,
            tap_unit: 1,
            tap_level: Some(tap_level),
            energy_level: Some(energy_level),
            profit_per_second: 0.0,
        }
    }

    fn budget(cap: u64, max_tap: u64, max_energy: u64) -> UpgradeBudget {
        UpgradeBudget {
            max_upgrade_cost: cap,
            max_tap_level: max_tap,
            max_energy_level: max_energy,
        }
    }

    fn levelup(level_field: &str, level: u64, coins: u64) -> core_logic::JsonResponse {
        core_logic::JsonResponse::ok(json!({
            "game_data": { "user": { level_field: level, "total_coins": coins } }
        }))
    }

    #[test]
    fn test_cost_is_linear_in_level() {
        assert_eq!(upgrade_cost(0), 0);
        assert_eq!(upgrade_cost(1), 1000);
        assert_eq!(upgrade_cost(7), 7000);
        assert_eq!(upgrade_cost(u64::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_buys_until_cost_cap() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(TAP_LEVELUP, levelup("tap_level", 2, 9000));
        transport.push(TAP_LEVELUP, levelup("tap_level", 3, 7000));
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        // level 3 would cost 3000, above the 2000 cap
        let mut state = state(10_000, 1, 1);
        let report = UpgradeScheduler::new(&client, budget(2000, 10, 10))
            .run(&test_support::session(), &mut state, Stat::Tap)
            .await;

        assert_eq!(report.purchases, 2);
        assert_eq!(report.level, Some(3));
        assert_eq!(report.coins, 7000);
        assert_eq!(transport.calls(TAP_LEVELUP), 2);
    }

    #[tokio::test]
    async fn test_never_buys_above_cap_even_when_affordable() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        let mut state = state(1_000_000, 5, 5);
        let report = UpgradeScheduler::new(&client, budget(4999, 10, 10))
            .run(&test_support::session(), &mut state, Stat::Energy)
            .await;

        assert_eq!(report.purchases, 0);
        assert_eq!(transport.calls(ENERGY_LEVELUP), 0);
        assert_eq!(state.total_coins, 1_000_000);
    }

    #[tokio::test]
    async fn test_stops_at_level_cap_and_on_balance() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(ENERGY_LEVELUP, levelup("energy_level", 3, 500));
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        let mut capped = state(100_000, 1, 3);
        let report = UpgradeScheduler::new(&client, budget(100_000, 10, 3))
            .run(&test_support::session(), &mut capped, Stat::Energy)
            .await;
        assert_eq!(report.purchases, 0);

        let mut poor = state(2500, 1, 2);
        let report = UpgradeScheduler::new(&client, budget(100_000, 10, 10))
            .run(&test_support::session(), &mut poor, Stat::Energy)
            .await;
        // one purchase at 2000, then 500 coins cannot cover 3000
        assert_eq!(report.purchases, 1);
        assert_eq!(report.coins, 500);
    }

    #[tokio::test]
    async fn test_failure_ends_the_run_and_keeps_balance() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(TAP_LEVELUP, test_support::error(400, "Insufficient funds"));
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        let mut state = state(50_000, 2, 1);
        let report = UpgradeScheduler::new(&client, budget(50_000, 10, 10))
            .run(&test_support::session(), &mut state, Stat::Tap)
            .await;

        assert_eq!(report.purchases, 0);
        assert_eq!(report.coins, 50_000);
        assert_eq!(transport.calls(TAP_LEVELUP), 1);
    }

    #[tokio::test]
    async fn test_level_that_does_not_advance_stops_the_run() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(TAP_LEVELUP, levelup("tap_level", 0, 100));
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        let mut state = state(100, 0, 0);
        let report = UpgradeScheduler::new(&client, budget(100, 10, 10))
            .run(&test_support::session(), &mut state, Stat::Tap)
            .await;

        assert_eq!(report.purchases, 1);
        assert_eq!(transport.calls(TAP_LEVELUP), 1);
    }

    #[tokio::test]
    async fn test_unknown_level_is_never_priced() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        // real level 5 costs 5000, above the 3000 cap
        transport.push(TAP_LEVELUP, levelup("tap_level", 6, 95_000));
        let mut state = GameState {
            tap_level: None,
            ..state(100_000, 0, 1)
        };
        let report = UpgradeScheduler::new(&client, budget(3000, 10, 10))
            .run(&test_support::session(), &mut state, Stat::Tap)
            .await;

        assert_eq!(report.purchases, 0);
        assert_eq!(report.level, None);
        assert_eq!(report.coins, 100_000);
        assert_eq!(transport.calls(TAP_LEVELUP), 0);
    }

    #[tokio::test]
    async fn test_success_without_level_is_not_counted() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            ENERGY_LEVELUP,
            core_logic::JsonResponse::ok(json!({ "game_data": { "user": { "total_coins": 8000 } } })),
        );
        transport.push(ENERGY_LEVELUP, levelup("energy_level", 3, 6000));
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());

        let mut state = state(10_000, 1, 2);
        let report = UpgradeScheduler::new(&client, budget(10_000, 10, 10))
            .run(&test_support::session(), &mut state, Stat::Energy)
            .await;

        assert_eq!(report.purchases, 0);
        assert_eq!(report.level, Some(2));
        assert_eq!(report.coins, 8000);
        assert_eq!(transport.calls(ENERGY_LEVELUP), 1);
    }
}
