//! Fill primitive - Replace an input's value

use crate::{
    errors::ActionError, locator, primitives::DefaultActionPrimitives, types::Locator,
};
use tracing::info;

/// Execute fill primitive
///
/// Focuses the element and clears it in-page, inserts `text` as one input
/// event, then fires `change` so framework bindings pick the value up.
pub async fn execute_fill(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
    text: &str,
) -> Result<(), ActionError> {
    // Length only; the value may be a password.
    info!(locator = %locator, chars = text.chars().count(), "Executing fill primitive");

    let focus = locator::focus_and_clear_script(locator);
    primitives.evaluate_on_element(locator, &focus).await?;

    if !text.is_empty() {
        primitives
            .cdp()
            .insert_text(primitives.page(), text)
            .await?;
    }

    let commit = locator::commit_input_script(locator);
    primitives.evaluate_on_element(locator, &commit).await?;
    Ok(())
}
