//! Run loop: every account, one at a time, forever
//!
//! Failures stay inside their account. The loop only stops on cancellation or
//! after a single pass in `once` mode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{AccountConfig, Settings};
use crate::cycle::{CycleReport, MaintenanceCycle};
use crate::session::SessionLauncher;

/// Sleep between passes: `interval` plus a uniform random `0..=jitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub interval: Duration,
    pub jitter: Duration,
}

impl Pacing {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: settings.interval(),
            jitter: settings.jitter(),
        }
    }

    pub fn next_sleep<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_secs = rng.gen_range(0..=self.jitter.as_secs());
        self.interval + Duration::from_secs(jitter_secs)
    }
}

/// Result of one account's pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountOutcome {
    Completed(CycleReport),
    Failed { email: String, error: String },
}

impl AccountOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, AccountOutcome::Completed(_))
    }
}

/// `<root>/<email>/<local ISO timestamp, seconds>.png`
pub fn screenshot_path(root: &Path, email: &str, at: DateTime<Local>) -> PathBuf {
    root.join(email)
        .join(format!("{}.png", at.format("%Y-%m-%dT%H:%M:%S")))
}

pub struct RunLoop<L> {
    settings: Settings,
    launcher: L,
    pacing: Pacing,
    cancel: CancellationToken,
}

impl<L: SessionLauncher> RunLoop<L> {
    pub fn new(settings: Settings, launcher: L) -> Self {
        let pacing = Pacing::from_settings(&settings);
        Self {
            settings,
            launcher,
            pacing,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Token that stops the loop between accounts and during sleeps.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Pass over all accounts until cancelled; a single pass when `once`.
    pub async fn run(&self, once: bool) {
        let mut pass = 0u64;
        loop {
            pass += 1;
            info!("starting pass {pass}");
            let outcomes = self.run_pass().await;
            let failed = outcomes.iter().filter(|o| !o.is_completed()).count();
            info!(
                "pass {pass} finished: {} completed, {failed} failed",
                outcomes.len() - failed
            );

            if once || self.cancel.is_cancelled() {
                break;
            }

            let sleep = self.pacing.next_sleep(&mut rand::thread_rng());
            info!("sleeping {}s", sleep.as_secs());
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }
        info!("run loop stopped");
    }

    /// One pass over every configured account, in order.
    pub async fn run_pass(&self) -> Vec<AccountOutcome> {
        let mut outcomes = Vec::with_capacity(self.settings.accounts.len());
        for account in &self.settings.accounts {
            if self.cancel.is_cancelled() {
                warn!("cancelled, skipping remaining accounts");
                break;
            }
            outcomes.push(self.run_account(account).await);
        }
        outcomes
    }

    /// Open a session, run the cycle, always close the session.
    pub async fn run_account(&self, account: &AccountConfig) -> AccountOutcome {
        let session = match self.launcher.open(account).await {
            Ok(session) => session,
            Err(err) => {
                let error = format!("{:#}", anyhow::Error::new(err));
                error!("{}: failed to open session: {error}", account.email);
                return AccountOutcome::Failed {
                    email: account.email.clone(),
                    error,
                };
            }
        };

        let board = session.board();
        let outcome = match MaintenanceCycle::new(account, board).run().await {
            Ok(report) => {
                info!(
                    "{}: cycle completed over {} habitats",
                    account.email,
                    report.habitats.len()
                );
                AccountOutcome::Completed(report)
            }
            Err(err) => {
                let error = format!("{:#}", anyhow::Error::new(err));
                error!("{}: cycle failed: {error}", account.email);
                if self.settings.debug {
                    let root = &self.settings.screenshots_path;
                    let path = screenshot_path(root, &account.email, Local::now());
                    match board.screenshot(&path).await {
                        Ok(()) => info!("screenshot saved to {}", path.display()),
                        Err(shot_err) => warn!("failed to capture screenshot: {shot_err}"),
                    }
                }
                AccountOutcome::Failed {
                    email: account.email.clone(),
                    error,
                }
            }
        };

        session.close().await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sleep_stays_within_jitter_window() {
        let pacing = Pacing {
            interval: Duration::from_secs(600),
            jitter: Duration::from_secs(60),
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let sleep = pacing.next_sleep(&mut rng);
            assert!(sleep >= Duration::from_secs(600));
            assert!(sleep <= Duration::from_secs(660));
        }
    }

    #[test]
    fn zero_jitter_is_exact() {
        let pacing = Pacing {
            interval: Duration::from_secs(60),
            jitter: Duration::ZERO,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pacing.next_sleep(&mut rng), Duration::from_secs(60));
    }

    #[test]
    fn screenshot_path_uses_email_and_second_precision() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 7).unwrap();
        let path = screenshot_path(Path::new("screenshots"), "lord@example.com", at);
        assert_eq!(
            path,
            PathBuf::from("screenshots/lord@example.com/2024-05-01T10:00:07.png")
        );
    }

    #[test]
    fn failure_text_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = crate::errors::SessionError::Profile {
            path: PathBuf::from("profiles/x"),
            source: io,
        };
        assert_eq!(
            format!("{:#}", anyhow::Error::new(err)),
            "failed to create profile directory profiles/x: denied"
        );
    }
}
