//! One account turn, start to finish.

use crate::client::{log_account_status, GameClient, HttpTransport};
use crate::config::TsubasaConfig;
use crate::engine::{
    CardUpgradeLoop, Stat, TapEngine, TapStop, TaskRunner, UpgradeScheduler,
};
use crate::error::ErrorKind;
use crate::session::AccountSession;
use crate::state::GameState;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{
    AccountStats, AccountWorker, Credential, ProxyConfig, ProxyManager, Transport,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyOutcome {
    Claimed,
    /// The server answered with a cooldown: today's reward is already taken
    AlreadyClaimed,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    Completed,
    /// Credential rejected; no call was made after the start call
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReport {
    pub name: String,
    pub outcome: AccountOutcome,
    pub coins: u64,
    pub taps: u64,
    pub tap_stop: Option<TapStop>,
    pub stat_upgrades: u64,
    pub cards_upgraded: usize,
    pub tasks_completed: usize,
    pub daily: Option<DailyOutcome>,
}

impl AccountReport {
    fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: AccountOutcome::Skipped,
            coins: 0,
            taps: 0,
            tap_stop: None,
            stat_upgrades: 0,
            cards_upgraded: 0,
            tasks_completed: 0,
            daily: None,
        }
    }
}

pub struct AccountRunner {
    client: GameClient,
    config: Arc<TsubasaConfig>,
}

impl AccountRunner {
    pub fn new(client: GameClient, config: Arc<TsubasaConfig>) -> Self {
        Self { client, config }
    }

    /// Start call, stat upgrades, tasks, taps, daily reward, cards; in that
    /// order. Only a start call failure other than a rejected credential
    /// comes back as an error.
    pub async fn run(&self, session: &mut AccountSession) -> Result<AccountReport> {
        let started = match self.client.start(session).await {
            Ok(started) => started,
            Err(e) if e.is(ErrorKind::InvalidCredential) => {
                error!(
                    "Invalid credential for {} | {}. Skipping account.",
                    session.display_name(),
                    e.message
                );
                return Ok(AccountReport::skipped(session.display_name()));
            }
            Err(e) => return Err(e).context("Start call failed"),
        };

        let session: &AccountSession = session;
        let mut state = started.state;
        log_account_status(&state);

        let features = self.config.features;
        let budget = self.config.budget;
        let mut stat_upgrades = 0;

        let levels_needed = (features.tap_upgrades && state.tap_level.is_none())
            || (features.energy_upgrades && state.energy_level.is_none());
        if levels_needed {
            self.read_levels(session, &mut state).await;
        }

        let scheduler = UpgradeScheduler::new(&self.client, budget);
        for (enabled, stat) in [
            (features.tap_upgrades, Stat::Tap),
            (features.energy_upgrades, Stat::Energy),
        ] {
            if enabled {
                let report = scheduler.run(session, &mut state, stat).await;
                stat_upgrades += report.purchases;
            }
        }

        let tasks = TaskRunner::new(&self.client)
            .run(session, &started.tasks)
            .await;

        let taps = TapEngine::new(&self.client).run(session, &mut state).await;

        let daily = match self.client.claim_daily(session).await {
            Ok(()) => {
                info!("Daily check-in successful");
                DailyOutcome::Claimed
            }
            Err(e) if e.is(ErrorKind::Cooldown) => {
                info!("You have already checked in today");
                DailyOutcome::AlreadyClaimed
            }
            Err(e) => {
                warn!("Failed to check in | {}", e.message);
                DailyOutcome::Failed(e.message)
            }
        };

        let mut cards_upgraded = 0;
        if features.card_upgrades {
            let report = CardUpgradeLoop::new(&self.client, budget)
                .run(session, state.total_coins)
                .await;
            cards_upgraded = report.upgraded.len();
            state.total_coins = report.coins;
        } else {
            info!("Card upgrades are disabled in the config.");
        }

        Ok(AccountReport {
            name: session.display_name().to_string(),
            outcome: AccountOutcome::Completed,
            coins: state.total_coins,
            taps: taps.taps,
            tap_stop: Some(taps.stop),
            stat_upgrades,
            cards_upgraded,
            tasks_completed: tasks.completed.len(),
            daily: Some(daily),
        })
    }
}

impl AccountRunner {
    /// The start call may leave stat levels out. A single tap reports them.
    async fn read_levels(&self, session: &AccountSession, state: &mut GameState) {
        match self.client.tap(session, 1).await {
            Ok(stats) => state.apply(&stats),
            Err(e) => warn!("Could not read upgrade levels | {}", e.message),
        }
    }
}

/// Roster worker: builds a session, a transport and an [`AccountRunner`]
/// for every account turn.
pub struct TsubasaWorker {
    config: Arc<TsubasaConfig>,
    proxies: Vec<ProxyConfig>,
    transport: Option<Arc<dyn Transport>>,
}

impl TsubasaWorker {
    pub fn new(config: Arc<TsubasaConfig>, proxies: Vec<ProxyConfig>) -> Self {
        Self {
            config,
            proxies,
            transport: None,
        }
    }

    /// Every account goes through `transport` instead of its own HTTP client.
    pub fn with_transport(config: Arc<TsubasaConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            proxies: Vec::new(),
            transport: Some(transport),
        }
    }

    fn transport_for(&self, index: usize) -> Result<Arc<dyn Transport>> {
        if let Some(transport) = &self.transport {
            return Ok(transport.clone());
        }

        let proxy = ProxyManager::assign(&self.proxies, index);
        if let Some(p) = proxy {
            info!("Using proxy {}", p.url);
        }
        Ok(Arc::new(HttpTransport::new(&self.config.api, proxy)?))
    }
}

#[async_trait]
impl AccountWorker for TsubasaWorker {
    async fn run_account(&self, index: usize, credential: &Credential) -> Result<AccountStats> {
        let mut session = AccountSession::new(credential.clone())
            .context("Credential carries no usable identity")?;

        let client = GameClient::new(
            self.transport_for(index)?,
            self.config.api.lang_code.clone(),
            self.config.timing,
        );
        let report = AccountRunner::new(client, self.config.clone())
            .run(&mut session)
            .await?;

        if report.outcome == AccountOutcome::Completed {
            info!(
                "Account done | Balance: {} | Taps: {} | Upgrades: {} | Cards: {} | Tasks: {}",
                report.coins,
                report.taps,
                report.stat_upgrades,
                report.cards_upgraded,
                report.tasks_completed
            );
        }

        Ok(AccountStats {
            coins: report.coins,
            taps: report.taps,
            skipped: report.outcome == AccountOutcome::Skipped,
        })
    }
}
