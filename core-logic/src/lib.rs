//! # Core Logic - Shared Utilities for Game Automation
//!
//! This crate provides the game-agnostic plumbing used by every game crate:
//! credential loading, the transport seam, retry policy, logging and the
//! roster loop that visits accounts one at a time.
//!
//! ## Modules
//!
//! - [`config`] - Roster scheduling and proxy configuration
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Per-turn and per-call metrics collection
//! - [`traits`] - Transport and account worker trait definitions
//! - `utils` - Credentials, proxies, logger, retry, roster runner

pub mod config;
pub mod error;
pub mod metrics;
pub mod traits;
pub(crate) mod utils;

pub use config::{ProxyConfig, RunnerConfig};
pub use error::{ConfigError, CredentialError, NetworkError};
pub use metrics::{MetricsCollector, MetricsSnapshot, TurnOutcome};
pub use traits::{AccountStats, AccountWorker, JsonResponse, Transport};

pub use utils::runner::PassSummary;
pub use utils::{
    setup_logger, AccountIdentity, Credential, CredentialManager, ProxyManager, RosterRunner,
};

pub use utils::retry::{retry_if, RetryConfig};
