//! Click primitive - Auto-wait for the element, then click its centre

use crate::{
    errors::ActionError, locator, primitives::DefaultActionPrimitives, types::Locator,
};
use cdp_adapter::MouseEventKind;
use serde_json::Value;
use tracing::{debug, info};

/// Execute click primitive
///
/// Steps:
/// 1. Poll until the locator resolves to a rendered element
/// 2. Scroll it into view and read the centre of its bounding box
/// 3. Dispatch move, press and release mouse events at that point
pub async fn execute_click(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
) -> Result<(), ActionError> {
    info!(locator = %locator, "Executing click primitive");

    let script = locator::click_point_script(locator);
    let point = primitives.evaluate_on_element(locator, &script).await?;
    let (x, y) = read_point(locator, &point)?;
    debug!(x, y, "Dispatching click");

    let cdp = primitives.cdp();
    let page = primitives.page();
    for kind in [
        MouseEventKind::Moved,
        MouseEventKind::Pressed,
        MouseEventKind::Released,
    ] {
        cdp.dispatch_mouse_event(page, kind, x, y).await?;
    }
    Ok(())
}

fn read_point(locator: &Locator, value: &Value) -> Result<(f64, f64), ActionError> {
    let coord = |key: &str| value.get(key).and_then(Value::as_f64);
    match (coord("x"), coord("y")) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(ActionError::Script(format!(
            "click point for {locator} missing coordinates: {value}"
        ))),
    }
}
