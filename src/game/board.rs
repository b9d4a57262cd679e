use std::path::Path;
use std::time::Duration;

use action_primitives::Locator;
use async_trait::async_trait;

use crate::config::AccountConfig;
use crate::errors::CycleError;
use crate::game::ResearchBuilding;

/// A building currently offering an upgrade.
///
/// Snapshots go stale after any click; callers re-read instead of reusing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBuilding {
    pub name: String,
    pub level: u32,
    /// Upgrade button of this building's row
    pub control: Locator,
}

/// Game-level operations on one logged-in page.
///
/// Methods that probe optional UI return `bool`/`Option` instead of failing;
/// any error is a hard failure for the account.
#[async_trait]
pub trait GameBoard: Send + Sync {
    async fn login(&self, account: &AccountConfig) -> Result<(), CycleError>;

    /// Dismiss the first popup found; `false` when none showed up in time.
    async fn dismiss_popup(&self) -> Result<bool, CycleError>;

    /// Raw title of the active habitat, `None` when the page shows nothing.
    async fn habitat_name(&self) -> Result<Option<String>, CycleError>;

    /// Toggle the building list of the active habitat.
    async fn toggle_building_list(&self) -> Result<(), CycleError>;

    /// Localised name of the ore storage building.
    async fn ore_store_name(&self) -> Result<String, CycleError>;

    async fn upgradable_buildings(&self) -> Result<Vec<ParsedBuilding>, CycleError>;

    /// Buildings with an upgrade in progress.
    async fn active_upgrades(&self) -> Result<usize, CycleError>;

    async fn upgrade_enabled(&self, building: &ParsedBuilding) -> Result<bool, CycleError>;

    async fn click_upgrade(&self, building: &ParsedBuilding) -> Result<(), CycleError>;

    async fn open_research(&self, building: ResearchBuilding) -> Result<(), CycleError>;

    async fn research_in_progress(&self) -> Result<bool, CycleError>;

    /// Click the first available research option; `false` when there is none.
    async fn start_first_research(&self) -> Result<bool, CycleError>;

    async fn select_next_habitat(&self) -> Result<(), CycleError>;

    async fn under_attack(&self) -> Result<bool, CycleError>;

    async fn toggle_mass_functions(&self) -> Result<(), CycleError>;

    async fn choose_missions(&self) -> Result<(), CycleError>;

    /// Choose silver exchange; `false` when no trade vehicle is available.
    async fn choose_silver_barter(&self) -> Result<bool, CycleError>;

    /// Click every "select all" link present.
    async fn select_all_habitats(&self) -> Result<(), CycleError>;

    /// Summary number of the open mass action.
    async fn mass_action_value(&self) -> Result<u64, CycleError>;

    async fn confirm_missions(&self) -> Result<(), CycleError>;

    async fn confirm_barter(&self) -> Result<(), CycleError>;

    async fn logout(&self) -> Result<(), CycleError>;

    async fn pause(&self, duration: Duration);

    async fn screenshot(&self, path: &Path) -> Result<(), CycleError>;
}
