//! Screenshot primitive - Full-page PNG to disk

use crate::{errors::ActionError, primitives::DefaultActionPrimitives};
use cdp_adapter::ScreenshotOptions;
use std::path::Path;
use tracing::info;

pub async fn execute_screenshot(
    primitives: &DefaultActionPrimitives,
    path: &Path,
) -> Result<(), ActionError> {
    let bytes = primitives
        .cdp()
        .screenshot(primitives.page(), &ScreenshotOptions::full_page_png())
        .await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "Screenshot saved");
    Ok(())
}
