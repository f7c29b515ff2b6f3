//! Game API client.
//!
//! One method per remote action. Every call goes through [`GameClient::call`],
//! which stamps the credential and session headers onto the request and turns
//! any non-200 answer into a classified [`ApiError`].

pub mod http;
pub mod models;

pub use http::HttpTransport;

use crate::config::TimingConfig;
use crate::engine::Stat;
use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::session::AccountSession;
use crate::state::GameState;
use core_logic::{retry_if, RetryConfig, Transport};
use models::{Card, GameEnvelope, QuestTask, UserStats, WireId};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const START: &str = "/start";
pub const TAP: &str = "/tap";
pub const ENERGY_RECOVERY: &str = "/energy/recovery";
pub const TAP_LEVELUP: &str = "/tap/levelup";
pub const ENERGY_LEVELUP: &str = "/energy/levelup";
pub const DAILY_REWARD: &str = "/daily_reward/claim";
pub const CARD_LEVELUP: &str = "/card/levelup";
pub const TASK_EXECUTE: &str = "/task/execute";
pub const TASK_ACHIEVEMENT: &str = "/task/achievement";

/// Result of a state fetch
#[derive(Debug, Clone)]
pub struct StartState {
    pub state: GameState,
    /// Tasks still worth executing (available or in progress)
    pub tasks: Vec<QuestTask>,
    /// Flattened card catalog, `None` when the server sent no `card_info`
    pub cards: Option<Vec<Card>>,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergySnapshot {
    pub energy: u64,
    pub max_energy: u64,
}

#[derive(Clone)]
pub struct GameClient {
    transport: Arc<dyn Transport>,
    lang_code: String,
    timing: TimingConfig,
}

impl GameClient {
    pub fn new(transport: Arc<dyn Transport>, lang_code: impl Into<String>, timing: TimingConfig) -> Self {
        Self {
            transport,
            lang_code: lang_code.into(),
            timing,
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    async fn call(&self, session: &AccountSession, endpoint: &str, mut body: Value) -> ApiResult<Value> {
        if let Value::Object(map) = &mut body {
            map.insert("initData".to_string(), Value::String(session.init_data().to_string()));
        }

        let response = self
            .transport
            .post_json(endpoint, &session.headers(), body)
            .await?;

        if response.is_ok() {
            return Ok(response.body);
        }

        let err = match response.message() {
            Some(message) => ApiError::from_message(message),
            None => ApiError::unknown(format!("Unexpected response | Status: {}", response.status)),
        };
        debug!("{} rejected | Status: {} | {}", endpoint, response.status, err.message);
        Err(err)
    }

    fn parse<T: DeserializeOwned>(endpoint: &str, body: Value) -> ApiResult<T> {
        serde_json::from_value(body)
            .map_err(|e| ApiError::unknown(format!("Malformed response from {} | {}", endpoint, e)))
    }

    /// Single state fetch. Does not touch the session.
    pub async fn fetch_state(&self, session: &AccountSession) -> ApiResult<StartState> {
        let body = self
            .call(session, START, json!({ "lang_code": self.lang_code }))
            .await?;
        let envelope: GameEnvelope = Self::parse(START, body)?;
        let state = GameState::from_stats(&envelope.game_data.user)?;

        let tasks = envelope
            .task_info
            .unwrap_or_default()
            .into_iter()
            .filter(|task| task.status.is_actionable())
            .collect();

        let cards = envelope
            .card_info
            .map(|categories| categories.into_iter().flat_map(|c| c.card_list).collect());

        Ok(StartState {
            state,
            tasks,
            cards,
            session_token: envelope.master_hash,
        })
    }

    /// Opening state fetch of an account turn. Waits out `Cooldown` answers
    /// (bounded by the timing config) and caches the session token.
    pub async fn start(&self, session: &mut AccountSession) -> ApiResult<StartState> {
        let policy = RetryConfig::fixed(
            self.timing.start_cooldown_retries,
            self.timing.cooldown_wait_secs.saturating_mul(1000),
        );

        let started = {
            let current: &AccountSession = session;
            retry_if(
                policy,
                "Start call",
                move || self.fetch_state(current),
                |e: &ApiError| e.is(ErrorKind::Cooldown),
            )
            .await?
        };

        if session.adopt_token(started.session_token.as_deref()) {
            debug!("Session token captured");
        }
        Ok(started)
    }

    /// Fresh card catalog, fetched through the start endpoint
    pub async fn card_catalog(&self, session: &AccountSession) -> ApiResult<Vec<Card>> {
        self.fetch_state(session)
            .await?
            .cards
            .ok_or_else(|| ApiError::unknown("Card information not found!"))
    }

    /// Spends `count` tap actions. The reply must carry the new energy level.
    pub async fn tap(&self, session: &AccountSession, count: u64) -> ApiResult<UserStats> {
        let body = self.call(session, TAP, json!({ "tapCount": count })).await?;
        let envelope: GameEnvelope = Self::parse(TAP, body)?;
        let user = envelope.game_data.user;
        if user.energy.is_none() {
            return Err(ApiError::unknown("Tap response carried no energy"));
        }
        Ok(user)
    }

    pub async fn recover_energy(&self, session: &AccountSession) -> ApiResult<EnergySnapshot> {
        let body = self.call(session, ENERGY_RECOVERY, json!({})).await?;
        let envelope: GameEnvelope = Self::parse(ENERGY_RECOVERY, body)?;
        match (envelope.game_data.user.energy, envelope.game_data.user.max_energy) {
            (Some(energy), Some(max_energy)) => Ok(EnergySnapshot { energy, max_energy }),
            _ => Err(ApiError::unknown("Recovery response carried no energy")),
        }
    }

    /// Buys one level of `stat`. Returns the user block as the server reports it.
    pub async fn level_up(&self, session: &AccountSession, stat: Stat) -> ApiResult<UserStats> {
        let endpoint = match stat {
            Stat::Tap => TAP_LEVELUP,
            Stat::Energy => ENERGY_LEVELUP,
        };
        let body = self.call(session, endpoint, json!({})).await?;
        let envelope: GameEnvelope = Self::parse(endpoint, body)?;
        Ok(envelope.game_data.user)
    }

    pub async fn claim_daily(&self, session: &AccountSession) -> ApiResult<()> {
        self.call(session, DAILY_REWARD, json!({})).await?;
        Ok(())
    }

    pub async fn level_up_card(&self, session: &AccountSession, card: &Card) -> ApiResult<()> {
        self.call(
            session,
            CARD_LEVELUP,
            json!({ "category_id": card.category_id, "card_id": card.card_id }),
        )
        .await?;
        Ok(())
    }

    pub async fn execute_task(&self, session: &AccountSession, task_id: &WireId) -> ApiResult<()> {
        let body = self
            .call(session, TASK_EXECUTE, json!({ "task_id": task_id }))
            .await?;
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ApiError::unknown(format!("Task {} was not accepted", task_id)));
        }
        Ok(())
    }

    /// Looks the task up in the refreshed task list. `None` when the server
    /// no longer lists it.
    pub async fn check_task_achievement(
        &self,
        session: &AccountSession,
        task_id: &WireId,
    ) -> ApiResult<Option<QuestTask>> {
        let body = self
            .call(session, TASK_ACHIEVEMENT, json!({ "task_id": task_id }))
            .await?;
        let envelope: GameEnvelope = Self::parse(TASK_ACHIEVEMENT, body)?;
        Ok(envelope
            .task_info
            .unwrap_or_default()
            .into_iter()
            .find(|task| &task.id == task_id))
    }
}

/// Logs the account summary shown after a successful start call.
pub fn log_account_status(state: &GameState) {
    info!("Balance: {}", state.total_coins);
    info!("Energy: {}/{}", state.energy, state.max_energy);
    info!("Multi Tap Count: {}", state.tap_unit);
    info!("Profit per second: {}", state.profit_per_second);
}
