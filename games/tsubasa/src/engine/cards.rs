use crate::client::models::{Card, WireId};
use crate::client::GameClient;
use crate::config::UpgradeBudget;
use crate::error::ErrorKind;
use crate::session::AccountSession;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStop {
    /// A full scan went by without a purchase
    NothingToBuy,
    InsufficientFunds,
    CatalogUnavailable,
    ScanLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradedCard {
    pub name: String,
    pub card_id: WireId,
    pub level: u64,
    pub cost: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReport {
    /// Local coin tally after the last confirmed purchase
    pub coins: u64,
    pub upgraded: Vec<UpgradedCard>,
    pub cooldowns: usize,
    pub stop: CardStop,
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Greedy card buyer. Each scan walks a fresh catalog from most to least
/// profitable and buys the first eligible card, then rescans. Cards that hit
/// a cooldown are remembered for the rest of this run only.
pub struct CardUpgradeLoop<'a> {
    client: &'a GameClient,
    budget: UpgradeBudget,
    max_scans: u32,
    clock: fn() -> i64,
}

impl<'a> CardUpgradeLoop<'a> {
    pub fn new(client: &'a GameClient, budget: UpgradeBudget) -> Self {
        Self {
            client,
            budget,
            max_scans: client.timing().max_card_scans,
            clock: unix_now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    fn eligible(&self, card: &Card, coins: u64) -> bool {
        card.unlocked && coins >= card.cost && card.cost <= self.budget.max_upgrade_cost
    }

    pub async fn run(&self, session: &AccountSession, coins: u64) -> CardReport {
        let mut coins = coins;
        let mut cooldown: HashSet<WireId> = HashSet::new();
        let mut upgraded = Vec::new();
        let mut scans = 0u32;

        let stop = 'outer: loop {
            if scans >= self.max_scans {
                warn!("Card scan limit of {} reached. Stopping card upgrades.", self.max_scans);
                break CardStop::ScanLimit;
            }
            scans += 1;

            let mut cards = match self.client.card_catalog(session).await {
                Ok(cards) => cards,
                Err(e) => {
                    warn!("Unable to get card information | {}", e.message);
                    break CardStop::CatalogUnavailable;
                }
            };
            cards.sort_by(|a, b| b.next_profit_per_hour.total_cmp(&a.next_profit_per_hour));

            let now = (self.clock)();
            let mut progressed = false;

            for card in &cards {
                if cooldown.contains(&card.card_id) {
                    continue;
                }
                if card.is_expired(now) {
                    warn!(
                        "Card {} ({}) has expired. Skipping upgrade.",
                        card.name, card.card_id
                    );
                    continue;
                }
                if !self.eligible(card, coins) {
                    continue;
                }

                match self.client.level_up_card(session, card).await {
                    Ok(()) => {
                        coins = coins.saturating_sub(card.cost);
                        info!(
                            "Upgraded card | {} | {} | {} | {} | Remaining balance: {}",
                            card.name,
                            card.card_id,
                            card.level + 1,
                            card.cost,
                            coins
                        );
                        upgraded.push(UpgradedCard {
                            name: card.name.clone(),
                            card_id: card.card_id.clone(),
                            level: card.level + 1,
                            cost: card.cost,
                        });
                        progressed = true;
                        break;
                    }
                    Err(e) if e.is(ErrorKind::Cooldown) => {
                        warn!(
                            "Cooldown for card {} ({}). Skipping for now.",
                            card.name, card.card_id
                        );
                        cooldown.insert(card.card_id.clone());
                    }
                    Err(e) if e.is(ErrorKind::InsufficientFunds) => {
                        warn!(
                            "Not enough coins to upgrade {} ({}). Stopping upgrades.",
                            card.name, card.card_id
                        );
                        break 'outer CardStop::InsufficientFunds;
                    }
                    Err(e) => {
                        error!(
                            "Failed to upgrade card {} ({}): {}",
                            card.name, card.card_id, e.message
                        );
                    }
                }
            }

            if !progressed {
                break CardStop::NothingToBuy;
            }
        };

        debug!(
            "Card loop finished | {:?} | Scans: {} | Purchases: {}",
            stop,
            scans,
            upgraded.len()
        );

        CardReport {
            coins,
            upgraded,
            cooldowns: cooldown.len(),
            stop,
        }
    }
}
