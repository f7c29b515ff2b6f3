//! # Tsubasa Rivals
//!
//! Multi-account automation for the Tsubasa Rivals game API.
//!
//! Each account turn runs through [`runner::AccountRunner`]:
//!
//! 1. fetch the game state (waiting out server cooldowns),
//! 2. buy tap and energy levels under the configured budget,
//! 3. execute and confirm open tasks,
//! 4. drain energy with taps and refill it when possible,
//! 5. claim the daily reward,
//! 6. buy card levels, most profitable first.
//!
//! The roster loop itself lives in `core_logic::RosterRunner`.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod runner;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{GameClient, HttpTransport, StartState};
pub use config::TsubasaConfig;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use runner::{AccountOutcome, AccountReport, AccountRunner, DailyOutcome, TsubasaWorker};
pub use session::AccountSession;
pub use state::GameState;
