//! Command parameter types exposed by the CDP adapter interface.

use serde::{Deserialize, Serialize};

/// Options for `Page.captureScreenshot`. Captures are always PNG.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenshotOptions {
    /// Capture the whole scrollable document instead of the viewport.
    pub full_page: bool,
}

impl ScreenshotOptions {
    pub fn full_page_png() -> Self {
        Self { full_page: true }
    }
}

/// Mouse event kinds forwarded to `Input.dispatchMouseEvent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Moved,
    Pressed,
    Released,
}

impl MouseEventKind {
    pub fn as_cdp(&self) -> &'static str {
        match self {
            MouseEventKind::Moved => "mouseMoved",
            MouseEventKind::Pressed => "mousePressed",
            MouseEventKind::Released => "mouseReleased",
        }
    }
}
