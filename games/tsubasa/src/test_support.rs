//! Scripted transport and JSON builders for unit tests.

use crate::session::AccountSession;
use async_trait::async_trait;
use core_logic::{Credential, JsonResponse, NetworkError, Transport};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const CREDENTIAL: &str =
    "query_id=AA&user=%7B%22id%22%3A7%2C%22first_name%22%3A%22Ozora%22%7D&auth_date=1&hash=abc";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n == name)
    }
}

/// Replays queued responses per endpoint and records every request. An
/// endpoint with nothing queued answers 500.
#[derive(Default)]
pub struct ScriptedTransport {
    queues: Mutex<HashMap<String, VecDeque<JsonResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, path: &str, response: JsonResponse) {
        self.queues
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(
        &self,
        path: &str,
        headers: &[(String, String)],
        body: Value,
    ) -> Result<JsonResponse, NetworkError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            headers: headers.to_vec(),
            body,
        });

        let next = self
            .queues
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front);

        Ok(next.unwrap_or_else(|| error(500, &format!("no scripted response for {}", path))))
    }
}

pub fn session() -> AccountSession {
    AccountSession::new(Credential::new(CREDENTIAL)).unwrap()
}

pub fn user(coins: u64, energy: u64, max_energy: u64, tap_unit: u64) -> Value {
    json!({
        "total_coins": coins,
        "energy": energy,
        "max_energy": max_energy,
        "multi_tap_count": tap_unit,
        "tap_level": 1,
        "energy_level": 1,
        "profit_per_second": 0.5
    })
}

pub fn start_response(
    coins: u64,
    energy: u64,
    max_energy: u64,
    tap_unit: u64,
    token: Option<&str>,
) -> JsonResponse {
    let mut body = json!({
        "game_data": { "user": user(coins, energy, max_energy, tap_unit) },
        "task_info": []
    });
    if let Some(token) = token {
        body["master_hash"] = json!(token);
    }
    JsonResponse::ok(body)
}

/// Start reply whose user block carries no `tap_level` or `energy_level`.
pub fn start_without_levels(coins: u64, energy: u64, max_energy: u64, tap_unit: u64) -> JsonResponse {
    let mut user = user(coins, energy, max_energy, tap_unit);
    if let Some(fields) = user.as_object_mut() {
        fields.remove("tap_level");
        fields.remove("energy_level");
    }
    JsonResponse::ok(json!({
        "game_data": { "user": user },
        "task_info": []
    }))
}

pub fn tap_response(energy: u64, coins: u64) -> JsonResponse {
    JsonResponse::ok(json!({
        "game_data": { "user": { "energy": energy, "total_coins": coins } }
    }))
}

pub fn recovery_response(energy: u64, max_energy: u64) -> JsonResponse {
    JsonResponse::ok(json!({
        "game_data": { "user": { "energy": energy, "max_energy": max_energy } }
    }))
}

pub fn card(category: i64, id: i64, cost: u64, next_profit: f64) -> Value {
    json!({
        "category": category,
        "id": id,
        "level": 1,
        "cost": cost,
        "unlocked": true,
        "name": format!("Card {}", id),
        "profit_per_hour": next_profit / 2.0,
        "next_profit_per_hour": next_profit,
        "end_datetime": null
    })
}

pub fn error(status: u16, message: &str) -> JsonResponse {
    JsonResponse {
        status,
        body: json!({ "message": message }),
    }
}
