//! Greedy upgrade stepper
//!
//! Walks the configured targets in priority order and clicks one upgrade at a
//! time, re-reading the building list after every click. It never assumes a
//! click raised a level and never batches clicks.

use tracing::info;

use crate::config::UpgradeTarget;
use crate::cycle::ActiveHabitat;
use crate::errors::CycleError;
use crate::game::constants::UPGRADE_SETTLE;
use crate::game::{GameBoard, ParsedBuilding};

/// Why the stepper stopped before considering every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeHalt {
    /// No building offered an upgrade.
    NothingUpgradable,
    /// No targets for this habitat (unknown type or empty plan).
    NoTargets,
    /// In-progress upgrades reached the slot limit.
    NoFreeSlots,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeReport {
    /// Upgrade clicks issued, in order, as building names
    pub clicked: Vec<String>,
    pub halt: Option<UpgradeHalt>,
}

impl UpgradeReport {
    fn halted(clicked: Vec<String>, halt: UpgradeHalt) -> Self {
        Self {
            clicked,
            halt: Some(halt),
        }
    }
}

fn find(buildings: &[ParsedBuilding], name: &str) -> Option<ParsedBuilding> {
    buildings.iter().find(|b| b.name == name).cloned()
}

/// Step the active habitat's buildings toward `targets`.
pub async fn run_upgrades<B>(
    board: &B,
    habitat: &ActiveHabitat,
    targets: &[UpgradeTarget],
    slot_limit: usize,
) -> Result<UpgradeReport, CycleError>
where
    B: GameBoard + ?Sized,
{
    let mut buildings = board.upgradable_buildings().await?;
    if buildings.is_empty() {
        info!("{habitat}: no buildings to upgrade");
        return Ok(UpgradeReport::halted(
            Vec::new(),
            UpgradeHalt::NothingUpgradable,
        ));
    }

    if targets.is_empty() {
        if habitat.kind.is_none() {
            info!("{habitat}: unknown habitat type");
        } else {
            info!("{habitat}: no upgrade targets configured");
        }
        return Ok(UpgradeReport::halted(Vec::new(), UpgradeHalt::NoTargets));
    }

    let mut clicked = Vec::new();
    for target in targets {
        let mut current = find(&buildings, &target.name);
        while let Some(building) = current.take().filter(|b| b.level < target.level) {
            if board.active_upgrades().await? >= slot_limit {
                info!("{habitat}: no free upgrade slots");
                return Ok(UpgradeReport::halted(clicked, UpgradeHalt::NoFreeSlots));
            }

            if !board.upgrade_enabled(&building).await? {
                info!("{habitat}: no resource to upgrade {}", target.name);
                break;
            }

            board.click_upgrade(&building).await?;
            info!(
                "{habitat}: upgrading {} to level {}",
                building.name,
                building.level + 1
            );
            clicked.push(building.name);
            board.pause(UPGRADE_SETTLE).await;

            buildings = board.upgradable_buildings().await?;
            current = find(&buildings, &target.name);
        }
    }

    Ok(UpgradeReport {
        clicked,
        halt: None,
    })
}
