//! Navigate primitive - Load a URL and wait for DOM ready

use crate::{errors::ActionError, primitives::DefaultActionPrimitives};
use std::time::Instant;
use tracing::{debug, info};

/// Execute navigate primitive
///
/// Steps:
/// 1. Validate URL
/// 2. Issue `Page.navigate` through the adapter
/// 3. Let the adapter poll `document.readyState` within the default timeout
pub async fn execute_navigate(
    primitives: &DefaultActionPrimitives,
    url: &str,
) -> Result<(), ActionError> {
    let start = Instant::now();
    info!(url, "Executing navigate primitive");

    if !validate_url(url) {
        return Err(ActionError::InvalidArgument(format!(
            "Invalid URL: {url}"
        )));
    }

    primitives
        .cdp()
        .navigate(primitives.page(), url, primitives.default_timeout())
        .await?;

    debug!(
        url,
        latency_ms = start.elapsed().as_millis() as u64,
        "Navigation completed"
    );
    Ok(())
}

fn validate_url(url: &str) -> bool {
    !url.is_empty()
        && (url.starts_with("http://")
            || url.starts_with("https://")
            || url.starts_with("file://")
            || url == "about:blank")
}
