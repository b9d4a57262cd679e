use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::commands::{MouseEventKind, ScreenshotOptions};
use crate::config::CdpConfig;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::ids::PageId;
use crate::registry::{AttachedPage, Registry};
use crate::transport::{CdpTransport, ChromiumTransport, CommandTarget};

const READY_POLL: Duration = Duration::from_millis(100);

/// Page-level capability surface required by the action layer.
#[async_trait]
pub trait Cdp: Send + Sync {
    async fn create_page(&self, url: &str) -> Result<PageId, AdapterError>;
    async fn navigate(&self, page: PageId, url: &str, deadline: Duration)
        -> Result<(), AdapterError>;
    async fn evaluate_script(&self, page: PageId, expression: &str) -> Result<Value, AdapterError>;
    async fn dispatch_mouse_event(
        &self,
        page: PageId,
        kind: MouseEventKind,
        x: f64,
        y: f64,
    ) -> Result<(), AdapterError>;
    async fn insert_text(&self, page: PageId, text: &str) -> Result<(), AdapterError>;
    async fn screenshot(
        &self,
        page: PageId,
        options: &ScreenshotOptions,
    ) -> Result<Vec<u8>, AdapterError>;
    async fn close_page(&self, page: PageId) -> Result<(), AdapterError>;
}

/// Adapter implementation with pluggable transport.
pub struct CdpAdapter {
    pub cfg: CdpConfig,
    registry: Registry,
    transport: Arc<dyn CdpTransport>,
    started: OnceCell<()>,
}

impl CdpAdapter {
    /// Adapter backed by a real Chromium process described by `cfg`.
    pub fn new(cfg: CdpConfig) -> Self {
        let transport: Arc<dyn CdpTransport> = Arc::new(ChromiumTransport::new(cfg.clone()));
        Self::with_transport(cfg, transport)
    }

    pub fn with_transport(cfg: CdpConfig, transport: Arc<dyn CdpTransport>) -> Self {
        Self {
            cfg,
            registry: Registry::new(),
            transport,
            started: OnceCell::new(),
        }
    }

    /// Start the transport. Idempotent.
    pub async fn start(&self) -> Result<(), AdapterError> {
        self.started
            .get_or_try_init(|| async {
                self.transport.start().await?;
                info!(
                    target: "cdp-adapter",
                    profile = %self.cfg.user_data_dir.display(),
                    headless = self.cfg.headless,
                    "browser transport started"
                );
                Ok::<(), AdapterError>(())
            })
            .await
            .map(|_| ())
    }

    /// Close the browser and release the transport.
    pub async fn shutdown(&self) {
        if self.started.initialized() {
            if let Err(err) = self.send_command("Browser.close", json!({})).await {
                debug!(target: "cdp-adapter", %err, "Browser.close failed; killing process");
            }
        }
        self.transport.stop().await;
        self.registry.clear();
    }

    async fn send_command(&self, method: &str, params: Value) -> Result<Value, AdapterError> {
        self.transport
            .send_command(CommandTarget::Browser, method, params)
            .await
    }

    async fn send_page_command(
        &self,
        page: PageId,
        method: &str,
        params: Value,
    ) -> Result<Value, AdapterError> {
        let session = self.registry.cdp_session(&page).ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("missing cdp session for page {page:?}"))
        })?;
        self.transport
            .send_command(CommandTarget::Session(session), method, params)
            .await
    }

    async fn wait_for_dom_ready(
        &self,
        page: PageId,
        deadline: Instant,
    ) -> Result<(), AdapterError> {
        loop {
            match self.evaluate_script(page, "document.readyState").await {
                Ok(Value::String(state)) if state == "interactive" || state == "complete" => {
                    return Ok(());
                }
                Ok(_) => {}
                Err(err) => debug!(target: "cdp-adapter", %err, "readyState probe failed"),
            }

            if Instant::now() >= deadline {
                return Err(AdapterError::new(AdapterErrorKind::NavTimeout)
                    .with_hint("document did not reach DOM ready before deadline"));
            }
            sleep(READY_POLL).await;
        }
    }

    async fn full_page_clip(&self, page: PageId) -> Result<Option<Value>, AdapterError> {
        let metrics = self
            .send_page_command(page, "Page.getLayoutMetrics", json!({}))
            .await?;
        let size = metrics
            .get("cssContentSize")
            .or_else(|| metrics.get("contentSize"));
        let clip = size.and_then(|size| {
            let width = size.get("width")?.as_f64()?;
            let height = size.get("height")?.as_f64()?;
            Some(json!({
                "x": 0,
                "y": 0,
                "width": width.ceil(),
                "height": height.ceil(),
                "scale": 1,
            }))
        });
        if clip.is_none() {
            warn!(target: "cdp-adapter", "layout metrics missing content size; capturing viewport");
        }
        Ok(clip)
    }
}

#[async_trait]
impl Cdp for CdpAdapter {
    async fn create_page(&self, url: &str) -> Result<PageId, AdapterError> {
        self.start().await?;
        let response = self
            .send_command("Target.createTarget", json!({ "url": url }))
            .await?;
        let target_id = response
            .get("targetId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AdapterError::new(AdapterErrorKind::Internal)
                    .with_hint("createTarget missing targetId")
            })?
            .to_string();

        let attached = self
            .send_command(
                "Target.attachToTarget",
                json!({ "targetId": target_id, "flatten": true }),
            )
            .await?;
        let cdp_session = attached
            .get("sessionId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AdapterError::new(AdapterErrorKind::Internal)
                    .with_hint("attachToTarget missing sessionId")
            })?
            .to_string();

        let page = PageId::new();
        self.registry.insert(
            page,
            AttachedPage {
                target_id,
                cdp_session,
            },
        );
        self.send_page_command(page, "Page.enable", json!({})).await?;
        self.send_page_command(page, "Runtime.enable", json!({}))
            .await?;
        debug!(target: "cdp-adapter", ?page, "page attached");
        Ok(page)
    }

    async fn navigate(
        &self,
        page: PageId,
        url: &str,
        deadline: Duration,
    ) -> Result<(), AdapterError> {
        let start = Instant::now();
        let response = self
            .send_page_command(page, "Page.navigate", json!({ "url": url }))
            .await?;
        if let Some(reason) = response.get("errorText").and_then(|v| v.as_str()) {
            return Err(AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint(format!("navigation to {url} failed: {reason}")));
        }
        let deadline_at = start
            .checked_add(deadline)
            .unwrap_or_else(|| start + Duration::from_secs(30));
        self.wait_for_dom_ready(page, deadline_at).await
    }

    async fn evaluate_script(&self, page: PageId, expression: &str) -> Result<Value, AdapterError> {
        let response = self
            .send_page_command(
                page,
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "awaitPromise": true,
                    "returnByValue": true,
                    "userGesture": true,
                }),
            )
            .await?;

        if let Some(details) = response.get("exceptionDetails") {
            let text = details
                .pointer("/exception/description")
                .or_else(|| details.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("unknown exception");
            return Err(AdapterError::new(AdapterErrorKind::Internal)
                .with_hint(format!("script raised: {text}")));
        }

        Ok(response
            .get("result")
            .and_then(|res| res.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn dispatch_mouse_event(
        &self,
        page: PageId,
        kind: MouseEventKind,
        x: f64,
        y: f64,
    ) -> Result<(), AdapterError> {
        let (button, buttons) = match kind {
            MouseEventKind::Moved => ("none", 0),
            MouseEventKind::Pressed | MouseEventKind::Released => ("left", 1),
        };
        self.send_page_command(
            page,
            "Input.dispatchMouseEvent",
            json!({
                "type": kind.as_cdp(),
                "x": x,
                "y": y,
                "button": button,
                "buttons": buttons,
                "clickCount": 1,
                "pointerType": "mouse",
            }),
        )
        .await
        .map(|_| ())
    }

    async fn insert_text(&self, page: PageId, text: &str) -> Result<(), AdapterError> {
        self.send_page_command(page, "Input.insertText", json!({ "text": text }))
            .await
            .map(|_| ())
    }

    async fn screenshot(
        &self,
        page: PageId,
        options: &ScreenshotOptions,
    ) -> Result<Vec<u8>, AdapterError> {
        let mut params = json!({ "format": "png" });
        if options.full_page {
            params["captureBeyondViewport"] = json!(true);
            if let Some(clip) = self.full_page_clip(page).await? {
                params["clip"] = clip;
            }
        }

        let response = self
            .send_page_command(page, "Page.captureScreenshot", params)
            .await?;
        let data = response
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AdapterError::new(AdapterErrorKind::Internal).with_hint("missing screenshot data")
            })?;
        STANDARD.decode(data).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Internal).with_hint(err.to_string())
        })
    }

    async fn close_page(&self, page: PageId) -> Result<(), AdapterError> {
        let Some(attached) = self.registry.remove(&page) else {
            return Ok(());
        };
        self.send_command(
            "Target.closeTarget",
            json!({ "targetId": attached.target_id }),
        )
        .await
        .map(|_| ())
    }
}
