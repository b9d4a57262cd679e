//! Action primitives implementation
//!
//! Page-level operations the game layer is written against:
//! 1. navigate - Load a URL and wait for the DOM
//! 2. click - Auto-wait for an element, then click its centre
//! 3. fill - Replace the value of an input field
//! 4. wait_for / count - Bounded waits and match counting
//! 5. text_content / inner_text / attribute - Element reads
//! 6. screenshot - Full-page PNG written to disk

mod click;
mod navigate;
mod read;
mod screenshot;
mod type_text;
mod wait;

use async_trait::async_trait;
use cdp_adapter::{Cdp, PageId};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::{
    errors::ActionError,
    locator::{self, Resolved},
    types::{Locator, WaitState},
    waiting::{poll_until, POLL_INTERVAL},
};

/// Page handle consumed by automation logic.
///
/// Element operations resolve their locator at call time and, except for
/// [`PageDriver::wait_for`] and [`PageDriver::count`], auto-wait up to the
/// driver's default timeout for the element to appear.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the document to be ready
    async fn navigate(&self, url: &str) -> Result<(), ActionError>;

    /// Wait until the locator reaches `state`; fails with a timeout error otherwise
    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> Result<(), ActionError>;

    /// Click the centre of the element
    async fn click(&self, locator: &Locator) -> Result<(), ActionError>;

    /// Replace the element's value with `text`
    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), ActionError>;

    /// Raw `textContent`, `None` when the DOM reports null
    async fn text_content(&self, locator: &Locator) -> Result<Option<String>, ActionError>;

    /// Rendered text
    async fn inner_text(&self, locator: &Locator) -> Result<String, ActionError>;

    async fn attribute(&self, locator: &Locator, name: &str)
        -> Result<Option<String>, ActionError>;

    /// Number of elements currently matching; never waits
    async fn count(&self, locator: &Locator) -> Result<usize, ActionError>;

    /// Fixed pause
    async fn delay(&self, duration: Duration);

    /// Full-page PNG written to `path`, creating parent directories
    async fn screenshot(&self, path: &Path) -> Result<(), ActionError>;
}

/// Default implementation of action primitives over a CDP page
pub struct DefaultActionPrimitives {
    /// CDP adapter for browser communication
    cdp: Arc<dyn Cdp>,

    page: PageId,

    /// Upper bound for navigation and element auto-waiting
    default_timeout: Duration,
}

impl DefaultActionPrimitives {
    pub fn new(cdp: Arc<dyn Cdp>, page: PageId, default_timeout: Duration) -> Self {
        Self {
            cdp,
            page,
            default_timeout,
        }
    }

    pub fn cdp(&self) -> &Arc<dyn Cdp> {
        &self.cdp
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Evaluate a resolver script once.
    pub(crate) async fn evaluate(
        &self,
        locator: &Locator,
        script: &str,
    ) -> Result<Resolved, ActionError> {
        let raw = self.cdp.evaluate_script(self.page, script).await?;
        locator::decode(locator, raw)
    }

    /// Evaluate a resolver script until the element exists, bounded by the default timeout.
    pub(crate) async fn evaluate_on_element(
        &self,
        locator: &Locator,
        script: &str,
    ) -> Result<Value, ActionError> {
        let what = format!("element {locator}");
        poll_until(&what, self.default_timeout, POLL_INTERVAL, move || async move {
            match self.evaluate(locator, script).await? {
                Resolved::Ok(value) => Ok(Some(value)),
                Resolved::NotFound | Resolved::NotVisible => Ok(None),
            }
        })
        .await
        .map_err(|err| match err {
            ActionError::WaitTimeout(detail) => ActionError::AnchorNotFound(detail),
            other => other,
        })
    }
}

#[async_trait]
impl PageDriver for DefaultActionPrimitives {
    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        navigate::execute_navigate(self, url).await
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        wait::execute_wait_for(self, locator, state, timeout).await
    }

    async fn click(&self, locator: &Locator) -> Result<(), ActionError> {
        click::execute_click(self, locator).await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), ActionError> {
        type_text::execute_fill(self, locator, text).await
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>, ActionError> {
        read::execute_text_content(self, locator).await
    }

    async fn inner_text(&self, locator: &Locator) -> Result<String, ActionError> {
        read::execute_inner_text(self, locator).await
    }

    async fn attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, ActionError> {
        read::execute_attribute(self, locator, name).await
    }

    async fn count(&self, locator: &Locator) -> Result<usize, ActionError> {
        wait::execute_count(self, locator).await
    }

    async fn delay(&self, duration: Duration) {
        sleep(duration).await;
    }

    async fn screenshot(&self, path: &Path) -> Result<(), ActionError> {
        screenshot::execute_screenshot(self, path).await
    }
}
