//! Per-account loops driven by [`crate::runner::AccountRunner`].

pub mod cards;
pub mod tap;
pub mod tasks;
pub mod upgrade;

pub use cards::{CardReport, CardStop, CardUpgradeLoop, UpgradedCard};
pub use tap::{tap_count, TapEngine, TapReport, TapStop};
pub use tasks::{CompletedTask, TaskReport, TaskRunner};
pub use upgrade::{upgrade_cost, Stat, UpgradeReport, UpgradeScheduler};
