//! Castellan: keeps Lords & Knights accounts busy.
//!
//! Logs into each configured account, walks every habitat to queue upgrades
//! and research, dispatches missions and silver barters, then sleeps and
//! starts over.

pub mod config;
pub mod cycle;
pub mod errors;
pub mod game;
pub mod logging;
pub mod runner;
pub mod session;
pub mod upgrade;

pub use config::{AccountConfig, Settings, UpgradePlan, UpgradeTarget};
pub use cycle::{ActiveHabitat, CycleReport, MaintenanceCycle};
pub use errors::{ConfigError, CycleError, SessionError};
pub use game::{GameBoard, HabitatType, ParsedBuilding, ResearchBuilding};
pub use runner::{AccountOutcome, Pacing, RunLoop};
pub use session::{AccountSession, ChromiumLauncher, SessionLauncher};
pub use upgrade::{run_upgrades, UpgradeHalt, UpgradeReport};
