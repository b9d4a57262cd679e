//! Page locators. These track the game's markup and break when it changes.

use action_primitives::Locator;

pub fn stale_logout() -> Locator {
    Locator::css(".form--data--logout")
}

pub fn email_field() -> Locator {
    Locator::css(r#"[placeholder="Email"]"#)
}

pub fn password_field() -> Locator {
    Locator::css(r#"[placeholder="Password"]"#)
}

pub fn login_button() -> Locator {
    Locator::xpath("//button[contains(normalize-space(.), 'Log in')]")
}

pub fn world(name: &str) -> Locator {
    Locator::text(name)
}

pub fn buildings_icon_bar() -> Locator {
    Locator::xpath("//div[contains(@class, 'icon-bar-buildings')]")
}

pub fn loading_overlay() -> Locator {
    Locator::xpath("//div[@id='over-layer--game-loading']")
}

/// Dismiss buttons of event popups, tried in order.
pub fn popup_buttons() -> [Locator; 2] {
    [
        Locator::css("#game-pop-up-layer .event-pop-up-button.ButtonRedAccept"),
        Locator::css("#game-pop-up-layer .event-pop-up-button.Back"),
    ]
}

pub fn habitat_title() -> Locator {
    Locator::css(".habitat-chooser .habitat-chooser--title span").first()
}

pub fn next_habitat() -> Locator {
    Locator::css(".habitat-chooser--title-row .arrow-right")
}

pub fn building_list_button() -> Locator {
    Locator::css("div.button-for-bars.top-bar-button--HabitatBuildings")
}

/// Name of the last building in the list, which is always the ore storage.
pub fn ore_store_name() -> Locator {
    Locator::xpath(
        "(//div[contains(@class, 'with-icon-left with-icon-right')]\
         //div[contains(@class, 'text-name-with-emo-icons')])[last()]",
    )
}

/// Building rows that offer a construct button.
pub fn upgradable_rows() -> Locator {
    Locator::xpath(
        "//div[contains(@class, 'with-icon-right') and button[contains(@class, 'construct')]]",
    )
}

/// Building rows with an upgrade in progress.
pub fn in_progress_rows() -> Locator {
    Locator::xpath(
        "//div[contains(@class, 'with-icon-right') and button[contains(@class, 'finish')]]",
    )
}

pub fn row_name(row: &Locator) -> Locator {
    row.locate(Locator::css(".text-name-with-emo-icons"))
}

pub fn row_description(row: &Locator) -> Locator {
    row.locate(Locator::css(".menu-list-element-basic--description"))
}

pub fn row_action(row: &Locator) -> Locator {
    row.locate(Locator::css(".menu-element--button--action"))
}

pub fn research_building(name: &str) -> Locator {
    Locator::css("#menu-section-general-container")
        .locate(Locator::text(name))
        .first()
}

pub fn research_in_progress() -> Locator {
    Locator::css(
        "#menu-section-drill-container .menu--content-section > div:last-child \
         .icon-research-finish",
    )
}

pub fn research_options() -> Locator {
    Locator::css(
        "#menu-section-drill-container .menu--content-section > div:last-child \
         .with-icon-right > button:not(.disabled) > \
         div:not(.icon-research-speedup):not(.icon-research-finish)",
    )
    .first()
}

pub fn under_attack_alert() -> Locator {
    Locator::css(
        "#game-bar-toggle .toggle-buttons--content__buttons [title='Castle'] .buttons--alert",
    )
}

pub fn mass_functions_button() -> Locator {
    Locator::css(".icon.icon-game.white.icon-general-functions")
}

pub fn mission_action() -> Locator {
    Locator::text("Carry out mission")
}

pub fn mission_confirm() -> Locator {
    Locator::text("Carry out mission").last()
}

pub fn exchange_action() -> Locator {
    Locator::text("Exchange resources")
}

pub fn silver_resource() -> Locator {
    Locator::text("Silver").last()
}

pub fn trade_vehicle() -> Locator {
    Locator::text("Ox cart")
}

pub fn barter_confirm() -> Locator {
    Locator::text("Barter Silver").last()
}

/// "Select all castles/fortresses/cities" links; each may be missing.
pub fn select_all_links() -> [Locator; 3] {
    [
        Locator::text_regex("^Select all castles"),
        Locator::text_regex("^Select all fortresses"),
        Locator::text_regex("^Select all cities"),
    ]
}

/// Summary value of the open mass action (eligible habitats or projected silver).
pub fn mass_action_value() -> Locator {
    Locator::css(".menu-list-element-basic--value").last()
}

pub fn profile_button() -> Locator {
    Locator::css(".icon.icon-game.white.icon-profile")
}

pub fn logout_link() -> Locator {
    Locator::text("Log out")
}
