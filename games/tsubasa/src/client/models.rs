//! Wire models for the game API.
//!
//! The server is loose with numeric types (coins sometimes arrive as floats,
//! ids as either numbers or strings), so amounts and ids go through lenient
//! deserializers instead of failing the whole response.

use chrono::DateTime;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier echoed back to the server exactly as it was received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Num(i64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Num(n) => write!(f, "{}", n),
            WireId::Text(s) => f.write_str(s),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Option<u64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative number, numeric string or null")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value.max(0) as u64))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.is_finite() {
            Ok(Some(value.max(0.0).floor() as u64))
        } else {
            Err(E::custom("non-finite amount"))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid amount '{}'", value)))?;
        self.visit_f64(parsed)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

fn de_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

fn de_amount_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(de_amount(deserializer)?.unwrap_or(0))
}

/// Unix seconds, accepted as a number, a numeric string or an RFC 3339 date.
fn de_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => {
            if let Ok(secs) = s.trim().parse::<i64>() {
                return Ok(Some(secs));
            }
            DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| Some(dt.timestamp()))
                .map_err(de::Error::custom)
        }
        Some(other) => Err(de::Error::custom(format!("invalid timestamp {}", other))),
    }
}

/// The `game_data.user` block. Every endpoint returns a subset of it, so all
/// fields are optional and merged into local state only when present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserStats {
    #[serde(default, deserialize_with = "de_amount")]
    pub total_coins: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub energy: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub max_energy: Option<u64>,
    /// Energy spent per tap action; the server calls it `multi_tap_count`
    #[serde(default, rename = "multi_tap_count", alias = "tap_unit", deserialize_with = "de_amount")]
    pub tap_unit: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub tap_level: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub tap_level_up_cost: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub energy_level: Option<u64>,
    #[serde(default, deserialize_with = "de_amount")]
    pub energy_level_up_cost: Option<u64>,
    #[serde(default)]
    pub profit_per_second: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub user: UserStats,
}

/// Envelope shared by every endpoint that reports the user block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameEnvelope {
    #[serde(default)]
    pub game_data: GameData,
    #[serde(default)]
    pub task_info: Option<Vec<QuestTask>>,
    #[serde(default)]
    pub card_info: Option<Vec<CardCategory>>,
    #[serde(default)]
    pub master_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum TaskStatus {
    Available,
    InProgress,
    Completed,
    Other(u8),
}

impl From<u8> for TaskStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => TaskStatus::Available,
            1 => TaskStatus::InProgress,
            2 => TaskStatus::Completed,
            other => TaskStatus::Other(other),
        }
    }
}

impl TaskStatus {
    /// Tasks worth executing: not started yet, or started but not confirmed
    pub fn is_actionable(self) -> bool {
        matches!(self, TaskStatus::Available | TaskStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestTask {
    pub id: WireId,
    #[serde(default)]
    pub title: String,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "de_amount_or_zero")]
    pub reward: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardCategory {
    #[serde(default)]
    pub card_list: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Card {
    #[serde(rename = "category")]
    pub category_id: WireId,
    #[serde(rename = "id")]
    pub card_id: WireId,
    #[serde(default, deserialize_with = "de_amount_or_zero")]
    pub level: u64,
    #[serde(default, deserialize_with = "de_amount_or_zero")]
    pub cost: u64,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profit_per_hour: f64,
    #[serde(default)]
    pub next_profit_per_hour: f64,
    #[serde(default, rename = "end_datetime", deserialize_with = "de_timestamp")]
    pub expires_at: Option<i64>,
}

impl Card {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|end| now > end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_stats_reads_multi_tap_count_and_float_coins() {
        let stats: UserStats = serde_json::from_value(json!({
            "total_coins": 1500.75,
            "energy": 90,
            "max_energy": 100,
            "multi_tap_count": 3,
            "profit_per_second": 1.5
        }))
        .unwrap();

        assert_eq!(stats.total_coins, Some(1500));
        assert_eq!(stats.tap_unit, Some(3));
        assert_eq!(stats.tap_level, None);
    }

    #[test]
    fn test_card_ids_keep_wire_type() {
        let card: Card = serde_json::from_value(json!({
            "category": 2,
            "id": "c-77",
            "level": 4,
            "cost": "5000",
            "unlocked": true,
            "name": "Striker",
            "profit_per_hour": 10.0,
            "next_profit_per_hour": 12.5,
            "end_datetime": null
        }))
        .unwrap();

        assert_eq!(card.category_id, WireId::Num(2));
        assert_eq!(card.card_id, WireId::Text("c-77".to_string()));
        assert_eq!(card.cost, 5000);
        assert!(!card.is_expired(i64::MAX));
        assert_eq!(serde_json::to_value(&card.card_id).unwrap(), json!("c-77"));
    }

    #[test]
    fn test_card_expiry_accepts_seconds_and_dates() {
        let by_secs: Card = serde_json::from_value(json!({
            "category": 1, "id": 1, "end_datetime": 1_000
        }))
        .unwrap();
        assert!(by_secs.is_expired(1_001));
        assert!(!by_secs.is_expired(1_000));

        let by_date: Card = serde_json::from_value(json!({
            "category": 1, "id": 2, "end_datetime": "1970-01-01T00:16:40Z"
        }))
        .unwrap();
        assert_eq!(by_date.expires_at, Some(1_000));
    }

    #[test]
    fn test_task_status_mapping() {
        let task: QuestTask =
            serde_json::from_value(json!({"id": 9, "title": "Follow", "status": 1, "reward": 500}))
                .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.status.is_actionable());
        assert!(!TaskStatus::from(2).is_actionable());
        assert_eq!(TaskStatus::from(7), TaskStatus::Other(7));
    }
}
