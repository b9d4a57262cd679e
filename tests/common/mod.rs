//! In-memory game used by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use action_primitives::Locator;
use async_trait::async_trait;
use castellan::{
    AccountConfig, CycleError, GameBoard, ParsedBuilding, ResearchBuilding, UpgradePlan,
    UpgradeTarget,
};

#[derive(Debug, Clone)]
pub struct FakeBuilding {
    pub name: String,
    pub level: u32,
    pub enabled: bool,
}

pub fn building(name: &str, level: u32) -> FakeBuilding {
    FakeBuilding {
        name: name.to_string(),
        level,
        enabled: true,
    }
}

pub fn disabled(name: &str, level: u32) -> FakeBuilding {
    FakeBuilding {
        enabled: false,
        ..building(name, level)
    }
}

#[derive(Debug, Clone)]
pub struct FakeHabitat {
    /// `None` renders an empty title
    pub name: Option<String>,
    pub store: String,
    pub buildings: Vec<FakeBuilding>,
    pub in_progress: usize,
    pub research_busy: bool,
    pub research_available: bool,
}

pub fn castle(name: &str, buildings: Vec<FakeBuilding>) -> FakeHabitat {
    FakeHabitat {
        name: Some(name.to_string()),
        store: "Ore store".to_string(),
        buildings,
        in_progress: 0,
        research_busy: false,
        research_available: true,
    }
}

pub fn with_store(mut habitat: FakeHabitat, store: &str) -> FakeHabitat {
    habitat.store = store.to_string();
    habitat
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MassAction {
    Missions,
    Barter,
}

#[derive(Debug)]
pub struct FakeWorld {
    pub habitats: Vec<FakeHabitat>,
    pub current: usize,
    pub popups: usize,
    pub endless_popups: bool,
    pub under_attack: bool,
    pub eligible_missions: u64,
    pub trade_vehicle: bool,
    pub projected_silver: u64,
    mass_action: Option<MassAction>,
}

impl FakeWorld {
    pub fn new(habitats: Vec<FakeHabitat>) -> Self {
        Self {
            habitats,
            current: 0,
            popups: 0,
            endless_popups: false,
            under_attack: false,
            eligible_missions: 0,
            trade_vehicle: true,
            projected_silver: 0,
            mass_action: None,
        }
    }

    fn habitat(&mut self) -> &mut FakeHabitat {
        let index = self.current;
        &mut self.habitats[index]
    }
}

/// Records every game action as a short event string.
pub struct FakeBoard {
    world: Mutex<FakeWorld>,
    events: Mutex<Vec<String>>,
}

impl FakeBoard {
    pub fn new(world: FakeWorld) -> Arc<Self> {
        Arc::new(Self {
            world: Mutex::new(world),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn with_world<T>(&self, f: impl FnOnce(&mut FakeWorld) -> T) -> T {
        f(&mut self.world.lock().unwrap())
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    fn control(name: &str) -> Locator {
        Locator::css(format!("#upgrade-{}", name.replace(' ', "-")))
    }
}

#[async_trait]
impl GameBoard for FakeBoard {
    async fn login(&self, account: &AccountConfig) -> Result<(), CycleError> {
        self.record(format!("login {}", account.email));
        Ok(())
    }

    async fn dismiss_popup(&self) -> Result<bool, CycleError> {
        let dismissed = self.with_world(|w| {
            if w.endless_popups {
                return true;
            }
            if w.popups > 0 {
                w.popups -= 1;
                return true;
            }
            false
        });
        if dismissed {
            self.record("popup");
        }
        Ok(dismissed)
    }

    async fn habitat_name(&self) -> Result<Option<String>, CycleError> {
        Ok(self.with_world(|w| w.habitat().name.clone()))
    }

    async fn toggle_building_list(&self) -> Result<(), CycleError> {
        self.record("building list");
        Ok(())
    }

    async fn ore_store_name(&self) -> Result<String, CycleError> {
        Ok(self.with_world(|w| w.habitat().store.clone()))
    }

    async fn upgradable_buildings(&self) -> Result<Vec<ParsedBuilding>, CycleError> {
        self.record("read buildings");
        Ok(self.with_world(|w| {
            w.habitat()
                .buildings
                .iter()
                .map(|b| ParsedBuilding {
                    name: b.name.clone(),
                    level: b.level,
                    control: Self::control(&b.name),
                })
                .collect()
        }))
    }

    async fn active_upgrades(&self) -> Result<usize, CycleError> {
        Ok(self.with_world(|w| w.habitat().in_progress))
    }

    async fn upgrade_enabled(&self, building: &ParsedBuilding) -> Result<bool, CycleError> {
        self.with_world(|w| {
            w.habitat()
                .buildings
                .iter()
                .find(|b| Self::control(&b.name) == building.control)
                .map(|b| b.enabled)
                .ok_or_else(|| CycleError::ControlStatusUnreadable {
                    building: building.name.clone(),
                })
        })
    }

    async fn click_upgrade(&self, building: &ParsedBuilding) -> Result<(), CycleError> {
        let habitat = self.with_world(|w| {
            let habitat = w.habitat();
            if let Some(b) = habitat
                .buildings
                .iter_mut()
                .find(|b| Self::control(&b.name) == building.control)
            {
                assert!(b.enabled, "clicked a disabled upgrade control");
                b.level += 1;
            }
            habitat.in_progress += 1;
            habitat.name.clone().unwrap_or_default()
        });
        self.record(format!("upgrade {habitat}/{}", building.name));
        Ok(())
    }

    async fn open_research(&self, building: ResearchBuilding) -> Result<(), CycleError> {
        self.record(format!("open {}", building.name()));
        Ok(())
    }

    async fn research_in_progress(&self) -> Result<bool, CycleError> {
        Ok(self.with_world(|w| w.habitat().research_busy))
    }

    async fn start_first_research(&self) -> Result<bool, CycleError> {
        let started = self.with_world(|w| {
            let habitat = w.habitat();
            if habitat.research_available {
                habitat.research_busy = true;
                true
            } else {
                false
            }
        });
        if started {
            self.record("research");
        }
        Ok(started)
    }

    async fn select_next_habitat(&self) -> Result<(), CycleError> {
        self.with_world(|w| w.current = (w.current + 1) % w.habitats.len());
        self.record("next habitat");
        Ok(())
    }

    async fn under_attack(&self) -> Result<bool, CycleError> {
        Ok(self.with_world(|w| w.under_attack))
    }

    async fn toggle_mass_functions(&self) -> Result<(), CycleError> {
        self.record("mass functions");
        Ok(())
    }

    async fn choose_missions(&self) -> Result<(), CycleError> {
        self.with_world(|w| w.mass_action = Some(MassAction::Missions));
        self.record("choose missions");
        Ok(())
    }

    async fn choose_silver_barter(&self) -> Result<bool, CycleError> {
        self.with_world(|w| w.mass_action = Some(MassAction::Barter));
        self.record("choose barter");
        Ok(self.with_world(|w| w.trade_vehicle))
    }

    async fn select_all_habitats(&self) -> Result<(), CycleError> {
        self.record("select all");
        Ok(())
    }

    async fn mass_action_value(&self) -> Result<u64, CycleError> {
        Ok(self.with_world(|w| match w.mass_action {
            Some(MassAction::Missions) => w.eligible_missions,
            Some(MassAction::Barter) => w.projected_silver,
            None => 0,
        }))
    }

    async fn confirm_missions(&self) -> Result<(), CycleError> {
        self.record("confirm missions");
        Ok(())
    }

    async fn confirm_barter(&self) -> Result<(), CycleError> {
        self.record("confirm barter");
        Ok(())
    }

    async fn logout(&self) -> Result<(), CycleError> {
        self.record("logout");
        Ok(())
    }

    async fn pause(&self, _duration: Duration) {}

    async fn screenshot(&self, path: &Path) -> Result<(), CycleError> {
        self.record(format!("screenshot {}", path.display()));
        Ok(())
    }
}

pub fn account(email: &str) -> AccountConfig {
    AccountConfig {
        email: email.to_string(),
        password: "secret".to_string(),
        world: "Glendale".to_string(),
        missions: false,
        silver_barter_threshold: 0,
        castle: UpgradePlan::default(),
        fortress: UpgradePlan::default(),
        city: UpgradePlan::default(),
    }
}

pub fn castle_plan(targets: &[(&str, u32)]) -> UpgradePlan {
    UpgradePlan {
        upgrades: targets
            .iter()
            .map(|(name, level)| UpgradeTarget::new(*name, *level))
            .collect(),
    }
}
