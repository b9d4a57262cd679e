//! Polling helper shared by the auto-waiting primitives

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::errors::ActionError;

/// Default cadence for in-page condition polling.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Repeatedly runs `probe` until it yields a value or `timeout` elapses.
///
/// The probe runs at least once, even with a zero timeout. Transient CDP
/// failures (a navigation tearing down the execution context) count as "not
/// yet"; the last one is reported if the deadline passes. Any other probe
/// error is returned immediately.
pub(crate) async fn poll_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T, ActionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ActionError>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;
    let mut last_error: Option<ActionError> = None;
    loop {
        attempts += 1;
        match probe().await {
            Ok(Some(value)) => {
                trace!(what, attempts, "condition met");
                return Ok(value);
            }
            Ok(None) => {}
            Err(err) if err.is_transient() => {
                debug!(what, attempts, error = %err, "probe failed, retrying");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
        if Instant::now() >= deadline {
            let mut message = format!("{what} not met within {}ms", timeout.as_millis());
            if let Some(err) = last_error {
                message.push_str(&format!(" (last error: {err})"));
            }
            return Err(ActionError::WaitTimeout(message));
        }
        sleep(interval).await;
    }
}
