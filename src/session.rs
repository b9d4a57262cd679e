//! Browser sessions, one per account pass

use std::sync::Arc;
use std::time::Duration;

use action_primitives::DefaultActionPrimitives;
use async_trait::async_trait;
use cdp_adapter::{Cdp, CdpAdapter, CdpConfig, PageId};
use tracing::{debug, info, warn};

use crate::config::{AccountConfig, Settings};
use crate::errors::SessionError;
use crate::game::{GameBoard, LordsPage};

/// An open page owned exclusively by one account for the length of a pass.
#[async_trait]
pub trait AccountSession: Send + Sync {
    fn board(&self) -> &dyn GameBoard;

    /// Release the page and the browser. Never fails; problems are logged.
    async fn close(&self);
}

/// Opens a fresh session for an account.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn open(&self, account: &AccountConfig)
        -> Result<Box<dyn AccountSession>, SessionError>;
}

/// Launches a Chromium per account with a persistent profile directory.
#[derive(Clone, Debug)]
pub struct ChromiumLauncher {
    settings: Settings,
}

impl ChromiumLauncher {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    fn page_timeout(&self) -> Duration {
        self.settings.page_timeout()
    }

    fn cdp_config(&self, account: &AccountConfig) -> CdpConfig {
        CdpConfig::for_profile(self.settings.profile_dir(account), self.settings.headless)
            .with_executable(self.settings.chrome_path.clone())
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn open(
        &self,
        account: &AccountConfig,
    ) -> Result<Box<dyn AccountSession>, SessionError> {
        let cfg = self.cdp_config(account);
        tokio::fs::create_dir_all(&cfg.user_data_dir)
            .await
            .map_err(|source| SessionError::Profile {
                path: cfg.user_data_dir.clone(),
                source,
            })?;
        debug!(
            profile = %cfg.user_data_dir.display(),
            headless = cfg.headless,
            "launching browser"
        );

        let adapter = Arc::new(CdpAdapter::new(cfg));
        if let Err(err) = adapter.start().await {
            adapter.shutdown().await;
            return Err(err.into());
        }
        let page = match adapter.create_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                adapter.shutdown().await;
                return Err(err.into());
            }
        };

        let timeout = self.page_timeout();
        let primitives = DefaultActionPrimitives::new(adapter.clone(), page, timeout);
        info!(email = %account.email, "browser session opened");
        Ok(Box::new(ChromiumSession {
            adapter,
            page,
            board: LordsPage::new(primitives, timeout),
        }))
    }
}

struct ChromiumSession {
    adapter: Arc<CdpAdapter>,
    page: PageId,
    board: LordsPage<DefaultActionPrimitives>,
}

#[async_trait]
impl AccountSession for ChromiumSession {
    fn board(&self) -> &dyn GameBoard {
        &self.board
    }

    async fn close(&self) {
        if let Err(err) = self.adapter.close_page(self.page).await {
            warn!("failed to close page: {err}");
        }
        self.adapter.shutdown().await;
    }
}
