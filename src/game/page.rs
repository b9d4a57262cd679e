//! [`GameBoard`] over a real page

use std::path::Path;
use std::time::Duration;

use action_primitives::{ActionError, Locator, PageDriver, WaitState};
use async_trait::async_trait;
use tracing::debug;

use crate::config::AccountConfig;
use crate::errors::CycleError;
use crate::game::constants::{
    parse_level, NEXT_HABITAT_SETTLE, POPUP_PROBE, SELECT_ALL_PROBE, SERVER_URL,
    STALE_LOGOUT_PROBE, VEHICLE_PROBE,
};
use crate::game::selectors;
use crate::game::{GameBoard, ParsedBuilding, ResearchBuilding};

/// Lords & Knights page driven through a [`PageDriver`].
pub struct LordsPage<P> {
    driver: P,
    timeout: Duration,
}

impl<P: PageDriver> LordsPage<P> {
    /// `timeout` bounds the mandatory waits during login.
    pub fn new(driver: P, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    pub fn driver(&self) -> &P {
        &self.driver
    }

    /// Click `locator` if it becomes visible within `timeout`.
    ///
    /// A timed-out probe means "absent". A click that still cannot land after
    /// a positive probe (the element vanished or was hidden again) is treated
    /// the same way.
    async fn click_if_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<bool, CycleError> {
        match self
            .driver
            .wait_for(locator, WaitState::Visible, timeout)
            .await
        {
            Ok(()) => match self.driver.click(locator).await {
                Ok(()) => Ok(true),
                Err(err)
                    if err.is_timeout() || matches!(err, ActionError::AnchorNotFound(_)) =>
                {
                    debug!(locator = %locator, error = %err, "optional element not clickable");
                    Ok(false)
                }
                Err(err) => Err(err.into()),
            },
            Err(err) if err.is_timeout() => {
                debug!(locator = %locator, "optional element absent");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_amount(raw: &str) -> Result<u64, CycleError> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | ' ' | '\u{a0}'))
        .collect();
    digits.parse().map_err(|_| CycleError::UnparsableNumber {
        what: "mass action value",
        raw: raw.to_string(),
    })
}

#[async_trait]
impl<P: PageDriver> GameBoard for LordsPage<P> {
    async fn login(&self, account: &AccountConfig) -> Result<(), CycleError> {
        self.driver.navigate(SERVER_URL).await?;

        // A remembered session shows a logout form instead of the login form.
        self.click_if_present(&selectors::stale_logout(), STALE_LOGOUT_PROBE)
            .await?;

        self.driver
            .fill(&selectors::email_field(), &account.email)
            .await?;
        self.driver
            .fill(&selectors::password_field(), &account.password)
            .await?;
        self.driver.click(&selectors::login_button()).await?;
        self.driver.click(&selectors::world(&account.world)).await?;

        self.driver
            .wait_for(
                &selectors::buildings_icon_bar(),
                WaitState::Attached,
                self.timeout,
            )
            .await?;
        self.driver
            .wait_for(
                &selectors::loading_overlay(),
                WaitState::Detached,
                self.timeout,
            )
            .await?;
        Ok(())
    }

    async fn dismiss_popup(&self) -> Result<bool, CycleError> {
        for button in selectors::popup_buttons() {
            if self.click_if_present(&button, POPUP_PROBE).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn habitat_name(&self) -> Result<Option<String>, CycleError> {
        Ok(self.driver.text_content(&selectors::habitat_title()).await?)
    }

    async fn toggle_building_list(&self) -> Result<(), CycleError> {
        Ok(self.driver.click(&selectors::building_list_button()).await?)
    }

    async fn ore_store_name(&self) -> Result<String, CycleError> {
        Ok(self.driver.inner_text(&selectors::ore_store_name()).await?)
    }

    async fn upgradable_buildings(&self) -> Result<Vec<ParsedBuilding>, CycleError> {
        let rows = selectors::upgradable_rows();
        let count = self.driver.count(&rows).await?;
        let mut buildings = Vec::with_capacity(count);
        for index in 0..count {
            let row = rows.clone().nth(index);
            let name = self.driver.inner_text(&selectors::row_name(&row)).await?;
            let description = self
                .driver
                .inner_text(&selectors::row_description(&row))
                .await?;
            let level = parse_level(&description).ok_or_else(|| CycleError::UnparsableNumber {
                what: "building level",
                raw: description.clone(),
            })?;
            buildings.push(ParsedBuilding {
                name: name.trim().to_string(),
                level,
                control: selectors::row_action(&row),
            });
        }
        Ok(buildings)
    }

    async fn active_upgrades(&self) -> Result<usize, CycleError> {
        Ok(self.driver.count(&selectors::in_progress_rows()).await?)
    }

    async fn upgrade_enabled(&self, building: &ParsedBuilding) -> Result<bool, CycleError> {
        let class = self.driver.attribute(&building.control, "class").await?;
        match class {
            Some(class) if !class.trim().is_empty() => {
                Ok(!class.split_whitespace().any(|c| c == "disabled"))
            }
            _ => Err(CycleError::ControlStatusUnreadable {
                building: building.name.clone(),
            }),
        }
    }

    async fn click_upgrade(&self, building: &ParsedBuilding) -> Result<(), CycleError> {
        Ok(self.driver.click(&building.control).await?)
    }

    async fn open_research(&self, building: ResearchBuilding) -> Result<(), CycleError> {
        Ok(self
            .driver
            .click(&selectors::research_building(building.name()))
            .await?)
    }

    async fn research_in_progress(&self) -> Result<bool, CycleError> {
        Ok(self.driver.count(&selectors::research_in_progress()).await? > 0)
    }

    async fn start_first_research(&self) -> Result<bool, CycleError> {
        let options = selectors::research_options();
        if self.driver.count(&options).await? == 0 {
            return Ok(false);
        }
        self.driver.click(&options).await?;
        Ok(true)
    }

    async fn select_next_habitat(&self) -> Result<(), CycleError> {
        self.driver.click(&selectors::next_habitat()).await?;
        self.driver.delay(NEXT_HABITAT_SETTLE).await;
        Ok(())
    }

    async fn under_attack(&self) -> Result<bool, CycleError> {
        Ok(self.driver.count(&selectors::under_attack_alert()).await? > 0)
    }

    async fn toggle_mass_functions(&self) -> Result<(), CycleError> {
        Ok(self
            .driver
            .click(&selectors::mass_functions_button())
            .await?)
    }

    async fn choose_missions(&self) -> Result<(), CycleError> {
        Ok(self.driver.click(&selectors::mission_action()).await?)
    }

    async fn choose_silver_barter(&self) -> Result<bool, CycleError> {
        self.driver.click(&selectors::exchange_action()).await?;
        self.driver.click(&selectors::silver_resource()).await?;
        self.click_if_present(&selectors::trade_vehicle(), VEHICLE_PROBE)
            .await
    }

    async fn select_all_habitats(&self) -> Result<(), CycleError> {
        for link in selectors::select_all_links() {
            self.click_if_present(&link, SELECT_ALL_PROBE).await?;
        }
        Ok(())
    }

    async fn mass_action_value(&self) -> Result<u64, CycleError> {
        let raw = self
            .driver
            .inner_text(&selectors::mass_action_value())
            .await?;
        parse_amount(&raw)
    }

    async fn confirm_missions(&self) -> Result<(), CycleError> {
        Ok(self.driver.click(&selectors::mission_confirm()).await?)
    }

    async fn confirm_barter(&self) -> Result<(), CycleError> {
        Ok(self.driver.click(&selectors::barter_confirm()).await?)
    }

    async fn logout(&self) -> Result<(), CycleError> {
        self.driver.click(&selectors::profile_button()).await?;
        self.driver.click(&selectors::logout_link()).await?;
        Ok(())
    }

    async fn pause(&self, duration: Duration) {
        self.driver.delay(duration).await;
    }

    async fn screenshot(&self, path: &Path) -> Result<(), CycleError> {
        Ok(self.driver.screenshot(path).await?)
    }
}
