//! Fixed game tables and timings

use std::fmt;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

pub const SERVER_URL: &str = "https://lordsandknights.com";

/// Concurrent upgrade slots per habitat.
pub const MAX_ACTIVE_UPGRADES: usize = 2;

/// Upper bound on popups dismissed after one login.
pub const MAX_POPUP_DISMISSALS: usize = 10;

pub const UPGRADE_SETTLE: Duration = Duration::from_secs(3);
pub const NEXT_HABITAT_SETTLE: Duration = Duration::from_secs(1);
pub const MASS_PANEL_SETTLE: Duration = Duration::from_secs(1);

/// Bounded waits for UI that may legitimately be absent.
pub const POPUP_PROBE: Duration = Duration::from_secs(2);
pub const SELECT_ALL_PROBE: Duration = Duration::from_secs(2);
pub const VEHICLE_PROBE: Duration = Duration::from_secs(2);
pub const STALE_LOGOUT_PROBE: Duration = Duration::from_secs(5);

static LEVEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)level (\d+)").expect("level pattern compiles"));

/// Extract the building level from a description such as `Level 7 (max 30)`.
pub fn parse_level(description: &str) -> Option<u32> {
    LEVEL_PATTERN
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HabitatType {
    Castle,
    Fortress,
    City,
}

impl HabitatType {
    /// Each habitat type names its ore storage differently.
    pub fn from_store_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Ore store" => Some(HabitatType::Castle),
            "Ore Storage" => Some(HabitatType::Fortress),
            "Ore Depot" => Some(HabitatType::City),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitatType::Castle => "castle",
            HabitatType::Fortress => "fortress",
            HabitatType::City => "city",
        }
    }
}

impl fmt::Display for HabitatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchBuilding {
    University,
    Library,
}

impl ResearchBuilding {
    /// Castles research in the Library, everything else in the University.
    pub fn for_habitat(habitat: Option<HabitatType>) -> Self {
        match habitat {
            Some(HabitatType::Castle) => ResearchBuilding::Library,
            _ => ResearchBuilding::University,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResearchBuilding::University => "University",
            ResearchBuilding::Library => "Library",
        }
    }
}
