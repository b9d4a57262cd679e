//! Wait primitive - Bounded waits on element state, and match counting

use crate::{
    errors::ActionError,
    locator::{self, Resolved},
    primitives::DefaultActionPrimitives,
    types::{Locator, WaitState},
    waiting::{poll_until, POLL_INTERVAL},
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Execute wait primitive
///
/// Polls until the locator is in `state`. A timeout surfaces as
/// [`ActionError::WaitTimeout`], which callers use to detect optional UI.
pub async fn execute_wait_for(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
    state: WaitState,
    timeout: Duration,
) -> Result<(), ActionError> {
    debug!(locator = %locator, ?state, timeout_ms = timeout.as_millis() as u64, "Waiting");

    let script = locator::probe_script(locator, state);
    let what = format!("{locator} {state:?}");
    let script = script.as_str();
    poll_until(&what, timeout, POLL_INTERVAL, move || async move {
        match primitives.evaluate(locator, script).await? {
            Resolved::Ok(value) => Ok(value
                .get("value")
                .and_then(Value::as_bool)
                .unwrap_or(false)
                .then_some(())),
            Resolved::NotFound | Resolved::NotVisible => Ok(None),
        }
    })
    .await
}

/// Count all current matches of the locator, ignoring its pick.
pub async fn execute_count(
    primitives: &DefaultActionPrimitives,
    locator: &Locator,
) -> Result<usize, ActionError> {
    let script = locator::count_script(locator);
    match primitives.evaluate(locator, &script).await? {
        Resolved::Ok(value) => value
            .get("value")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .ok_or_else(|| ActionError::Script(format!("count for {locator} returned {value}"))),
        Resolved::NotFound | Resolved::NotVisible => Ok(0),
    }
}
