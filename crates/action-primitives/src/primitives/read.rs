//! Read primitives - Element text and attributes

use crate::{
    errors::ActionError, locator, primitives::DefaultActionPrimitives, types::Locator,
};
use serde_json::Value;

fn optional_string(locator: &Locator, value: &Value) -> Result<Option<String>, ActionError> {
    match value.get("value") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ActionError::Script(format!(
            "expected text for {locator}, got {other}"
        ))),
    }
}

pub async fn execute_text_content(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
) -> Result<Option<String>, ActionError> {
    let script = locator::text_content_script(locator);
    let value = primitives.evaluate_on_element(locator, &script).await?;
    optional_string(locator, &value)
}

pub async fn execute_inner_text(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
) -> Result<String, ActionError> {
    let script = locator::inner_text_script(locator);
    let value = primitives.evaluate_on_element(locator, &script).await?;
    Ok(optional_string(locator, &value)?.unwrap_or_default())
}

pub async fn execute_attribute(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
    name: &str,
) -> Result<Option<String>, ActionError> {
    let script = locator::attribute_script(locator, name);
    let value = primitives.evaluate_on_element(locator, &script).await?;
    optional_string(locator, &value)
}
