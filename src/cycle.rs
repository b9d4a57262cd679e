//! Habitat maintenance cycle
//!
//! One authenticated pass over an account: every habitat gets upgrades and
//! research, then the account-wide mission and silver barter actions run once.

use std::fmt;

use tracing::{info, warn};

use crate::config::AccountConfig;
use crate::errors::CycleError;
use crate::game::constants::{MASS_PANEL_SETTLE, MAX_ACTIVE_UPGRADES, MAX_POPUP_DISMISSALS};
use crate::game::{GameBoard, HabitatType, ResearchBuilding};
use crate::upgrade::{run_upgrades, UpgradeReport};

/// The habitat currently shown. Displays as the `[type]name` log prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveHabitat {
    pub name: String,
    pub kind: Option<HabitatType>,
}

impl fmt::Display for ActiveHabitat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "[{kind}]{}", self.name),
            None => write!(f, "[unknown]{}", self.name),
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Habitat names in visiting order
    pub habitats: Vec<String>,
    pub popups_dismissed: usize,
    pub upgrades: Vec<String>,
    pub research_orders: usize,
    pub missions_started: bool,
    pub barter_ordered: bool,
}

pub struct MaintenanceCycle<'a, B: ?Sized> {
    account: &'a AccountConfig,
    board: &'a B,
    habitat: ActiveHabitat,
    slot_limit: usize,
}

impl<'a, B> MaintenanceCycle<'a, B>
where
    B: GameBoard + ?Sized,
{
    pub fn new(account: &'a AccountConfig, board: &'a B) -> Self {
        Self {
            account,
            board,
            habitat: ActiveHabitat::default(),
            slot_limit: MAX_ACTIVE_UPGRADES,
        }
    }

    pub fn habitat(&self) -> &ActiveHabitat {
        &self.habitat
    }

    /// Log in, maintain every habitat, run account-wide actions, log out.
    pub async fn run(&mut self) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::default();

        self.board.login(self.account).await?;
        info!("logged in as {}", self.account.email);
        report.popups_dismissed = self.dismiss_popups().await?;

        self.refresh_habitat_name().await?;
        let first = self.habitat.name.clone();

        loop {
            report.habitats.push(self.habitat.name.clone());
            self.board.toggle_building_list().await?;
            let store = self.board.ore_store_name().await?;
            self.habitat.kind = HabitatType::from_store_name(&store);

            let targets = self.account.upgrades_for(self.habitat.kind);
            let UpgradeReport { clicked, .. } =
                run_upgrades(self.board, &self.habitat, targets, self.slot_limit).await?;
            report.upgrades.extend(clicked);

            if self.research().await? {
                report.research_orders += 1;
            }
            self.board.toggle_building_list().await?;

            self.board.select_next_habitat().await?;
            self.refresh_habitat_name().await?;
            if self.habitat.name == first {
                break;
            }
        }

        report.missions_started = self.send_to_missions().await?;
        report.barter_ordered = self.silver_barter().await?;

        self.board.logout().await?;
        Ok(report)
    }

    /// The same popup can come back after dismissal; rescan until none shows.
    async fn dismiss_popups(&self) -> Result<usize, CycleError> {
        let mut dismissed = 0;
        while self.board.dismiss_popup().await? {
            dismissed += 1;
            info!("popup closed");
            if dismissed >= MAX_POPUP_DISMISSALS {
                warn!("still seeing popups after {dismissed} dismissals, continuing");
                break;
            }
        }
        Ok(dismissed)
    }

    async fn refresh_habitat_name(&mut self) -> Result<(), CycleError> {
        let name = self
            .board
            .habitat_name()
            .await?
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(CycleError::HabitatNameUnreadable)?;
        self.habitat.name = name;
        Ok(())
    }

    async fn research(&self) -> Result<bool, CycleError> {
        let building = ResearchBuilding::for_habitat(self.habitat.kind);
        self.board.open_research(building).await?;
        if self.board.research_in_progress().await? {
            return Ok(false);
        }
        let ordered = self.board.start_first_research().await?;
        if ordered {
            info!("{}: research ordered", self.habitat);
        }
        Ok(ordered)
    }

    async fn send_to_missions(&self) -> Result<bool, CycleError> {
        if !self.account.missions {
            return Ok(false);
        }
        if self.board.under_attack().await? {
            info!("missions skipped due to 'under attack' status");
            return Ok(false);
        }

        self.board.toggle_mass_functions().await?;
        self.board.choose_missions().await?;
        self.board.select_all_habitats().await?;

        let eligible = self.board.mass_action_value().await?;
        let started = eligible > 0;
        if started {
            self.board.confirm_missions().await?;
            info!("missions started");
        } else {
            info!("no available missions");
        }

        self.board.toggle_mass_functions().await?;
        self.board.pause(MASS_PANEL_SETTLE).await;
        Ok(started)
    }

    async fn silver_barter(&self) -> Result<bool, CycleError> {
        let threshold = self.account.silver_barter_threshold;
        if threshold == 0 {
            return Ok(false);
        }

        self.board.toggle_mass_functions().await?;
        if !self.board.choose_silver_barter().await? {
            info!("no Ox cart found to barter silver");
            self.board.toggle_mass_functions().await?;
            return Ok(false);
        }
        self.board.select_all_habitats().await?;

        let amount = self.board.mass_action_value().await?;
        let ordered = amount >= threshold;
        if ordered {
            self.board.confirm_barter().await?;
            info!("silver barter ordered");
        } else {
            info!("not enough expected silver to exchange: {amount}");
        }

        self.board.toggle_mass_functions().await?;
        self.board.pause(MASS_PANEL_SETTLE).await;
        Ok(ordered)
    }
}
