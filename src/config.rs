//! Configuration loading
//!
//! A single YAML document describes the run loop and every account. Unknown
//! keys are ignored; missing or mistyped keys fail with the offending field
//! path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::game::HabitatType;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// One week.
const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
/// One day.
const MAX_JITTER_SECONDS: u64 = 24 * 60 * 60;

/// Top-level settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// Root for per-account persistent browser profiles
    #[serde(default = "default_profiles_path")]
    pub profiles_path: PathBuf,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Minutes between passes over all accounts
    pub interval: u64,

    /// Screenshot the page when an account pass fails
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_screenshots_path")]
    pub screenshots_path: PathBuf,

    /// Upper bound of the random extra sleep added to `interval`
    #[serde(default = "default_jitter_seconds")]
    pub jitter_seconds: u64,

    /// Bounded wait applied to navigation and element actions
    #[serde(default = "default_page_timeout_seconds")]
    pub page_timeout_seconds: u64,

    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    pub accounts: Vec<AccountConfig>,
}

fn default_profiles_path() -> PathBuf {
    PathBuf::from("profiles")
}

fn default_headless() -> bool {
    true
}

fn default_screenshots_path() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_jitter_seconds() -> u64 {
    60
}

fn default_page_timeout_seconds() -> u64 {
    120
}

impl Settings {
    /// Read, parse and validate the document at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_yaml(&raw).map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse and validate a YAML document; errors name the field path.
    pub fn from_yaml(raw: &str) -> Result<Self, String> {
        let settings: Settings = serde_yaml::from_str(raw).map_err(|err| err.to_string())?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), String> {
        if self.interval == 0 {
            return Err("interval: must be at least 1 minute".to_string());
        }
        if self.interval > MAX_INTERVAL_MINUTES {
            return Err(format!("interval: must be at most {MAX_INTERVAL_MINUTES} minutes"));
        }
        if self.jitter_seconds > MAX_JITTER_SECONDS {
            return Err(format!("jitter_seconds: must be at most {MAX_JITTER_SECONDS} seconds"));
        }
        if self.page_timeout_seconds == 0 {
            return Err("page_timeout_seconds: must be at least 1 second".to_string());
        }
        if self.accounts.is_empty() {
            return Err("accounts: at least one account is required".to_string());
        }
        for (index, account) in self.accounts.iter().enumerate() {
            account.validate(&format!("accounts[{index}]"))?;
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval * 60)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_secs(self.jitter_seconds)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    /// Persistent browser profile directory for one account.
    pub fn profile_dir(&self, account: &AccountConfig) -> PathBuf {
        self.profiles_path.join(&account.email)
    }
}

/// One game account and what to do with it.
#[derive(Clone, Deserialize)]
pub struct AccountConfig {
    pub email: String,
    pub password: String,
    /// World name as shown on the world-selection screen
    pub world: String,
    pub missions: bool,
    /// Minimum projected silver for a barter; 0 disables bartering
    pub silver_barter_threshold: u64,
    pub castle: UpgradePlan,
    pub fortress: UpgradePlan,
    pub city: UpgradePlan,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("world", &self.world)
            .field("missions", &self.missions)
            .field("silver_barter_threshold", &self.silver_barter_threshold)
            .field("castle", &self.castle)
            .field("fortress", &self.fortress)
            .field("city", &self.city)
            .finish()
    }
}

impl AccountConfig {
    fn validate(&self, at: &str) -> Result<(), String> {
        for (field, value) in [
            ("email", &self.email),
            ("password", &self.password),
            ("world", &self.world),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{at}.{field}: must not be empty"));
            }
        }
        for (kind, plan) in [
            ("castle", &self.castle),
            ("fortress", &self.fortress),
            ("city", &self.city),
        ] {
            for (index, target) in plan.upgrades.iter().enumerate() {
                if target.name.trim().is_empty() {
                    return Err(format!(
                        "{at}.{kind}.upgrades[{index}].name: must not be empty"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Ordered upgrade targets for a habitat type; empty when the type is unknown.
    pub fn upgrades_for(&self, habitat: Option<HabitatType>) -> &[UpgradeTarget] {
        match habitat {
            Some(HabitatType::Castle) => &self.castle.upgrades,
            Some(HabitatType::Fortress) => &self.fortress.upgrades,
            Some(HabitatType::City) => &self.city.upgrades,
            None => &[],
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpgradePlan {
    pub upgrades: Vec<UpgradeTarget>,
}

/// Desired level for one building; list order is priority.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UpgradeTarget {
    pub name: String,
    pub level: u32,
}

impl UpgradeTarget {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
interval: 30
accounts:
  - email: lord@example.com
    password: secret
    world: Glendale
    missions: true
    silver_barter_threshold: 0
    castle:
      upgrades:
        - name: Barracks
          level: 5
    fortress:
      upgrades: []
    city:
      upgrades: []
"#;

    #[test]
    fn applies_defaults() {
        let settings = Settings::from_yaml(MINIMAL).unwrap();
        assert!(settings.headless);
        assert!(!settings.debug);
        assert_eq!(settings.profiles_path, PathBuf::from("profiles"));
        assert_eq!(settings.screenshots_path, PathBuf::from("screenshots"));
        assert_eq!(settings.interval(), Duration::from_secs(1800));
        assert_eq!(settings.jitter(), Duration::from_secs(60));
        assert_eq!(settings.page_timeout(), Duration::from_secs(120));
        assert_eq!(
            settings.profile_dir(&settings.accounts[0]),
            PathBuf::from("profiles/lord@example.com")
        );
    }

    #[test]
    fn missing_interval_names_the_field() {
        let raw = MINIMAL.replace("interval: 30\n", "");
        let err = Settings::from_yaml(&raw).unwrap_err();
        assert!(err.contains("interval"), "{err}");
    }

    #[test]
    fn nested_errors_carry_the_path() {
        let raw = MINIMAL.replace("    world: Glendale\n", "");
        let err = Settings::from_yaml(&raw).unwrap_err();
        assert!(err.contains("accounts[0]"), "{err}");
        assert!(err.contains("world"), "{err}");
    }

    #[test]
    fn wrong_type_is_rejected() {
        let raw = MINIMAL.replace("missions: true", "missions: sometimes");
        let err = Settings::from_yaml(&raw).unwrap_err();
        assert!(err.contains("missions"), "{err}");
    }

    #[test]
    fn semantic_checks_name_the_path() {
        let err = Settings::from_yaml(&MINIMAL.replace("interval: 30", "interval: 0")).unwrap_err();
        assert!(err.starts_with("interval"), "{err}");

        let huge = MINIMAL.replace("interval: 30", "interval: 18446744073709551615");
        let err = Settings::from_yaml(&huge).unwrap_err();
        assert!(err.starts_with("interval: must be at most"), "{err}");

        let err = Settings::from_yaml(&MINIMAL.replace("email: lord@example.com", "email: \"\""))
            .unwrap_err();
        assert!(err.starts_with("accounts[0].email"), "{err}");
    }

    #[test]
    fn upgrades_follow_habitat_type() {
        let settings = Settings::from_yaml(MINIMAL).unwrap();
        let account = &settings.accounts[0];
        assert_eq!(
            account.upgrades_for(Some(HabitatType::Castle)),
            &[UpgradeTarget::new("Barracks", 5)]
        );
        assert!(account.upgrades_for(Some(HabitatType::City)).is_empty());
        assert!(account.upgrades_for(None).is_empty());
    }

    #[test]
    fn debug_output_hides_password() {
        let settings = Settings::from_yaml(MINIMAL).unwrap();
        let rendered = format!("{:?}", settings.accounts[0]);
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = Settings::load(Path::new("/nonexistent/castellan/config.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "/nonexistent/castellan/config.yml file not found"
        );
    }
}
