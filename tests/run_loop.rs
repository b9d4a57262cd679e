mod common;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use castellan::runner::Pacing;
use castellan::{
    AccountConfig, AccountOutcome, AccountSession, GameBoard, RunLoop, SessionError,
    SessionLauncher, Settings,
};
use cdp_adapter::{AdapterError, AdapterErrorKind};
use common::*;

struct FakeSession {
    board: Arc<FakeBoard>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl AccountSession for FakeSession {
    fn board(&self) -> &dyn GameBoard {
        self.board.as_ref()
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out a fresh board per open; accounts without a world fail to launch.
#[derive(Default)]
struct FakeLauncher {
    worlds: HashMap<String, fn() -> FakeWorld>,
    opened: Mutex<Vec<String>>,
    boards: Mutex<Vec<Arc<FakeBoard>>>,
    closed: Arc<AtomicUsize>,
}

impl FakeLauncher {
    fn with(mut self, email: &str, world: fn() -> FakeWorld) -> Self {
        self.worlds.insert(email.to_string(), world);
        self
    }

    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn boards(&self) -> Vec<Arc<FakeBoard>> {
        self.boards.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn open(
        &self,
        account: &AccountConfig,
    ) -> Result<Box<dyn AccountSession>, SessionError> {
        self.opened.lock().unwrap().push(account.email.clone());
        let world = self.worlds.get(&account.email).ok_or_else(|| {
            SessionError::Launch(
                AdapterError::new(AdapterErrorKind::CdpIo).with_hint("chrome exited"),
            )
        })?;
        let board = FakeBoard::new(world());
        self.boards.lock().unwrap().push(board.clone());
        Ok(Box::new(FakeSession {
            board,
            closed: self.closed.clone(),
        }))
    }
}

fn healthy() -> FakeWorld {
    FakeWorld::new(vec![castle("Home", vec![building("Barracks", 1)])])
}

fn broken() -> FakeWorld {
    let mut habitat = castle("Ruins", vec![]);
    habitat.name = None;
    FakeWorld::new(vec![habitat])
}

fn settings(emails: &[&str], debug: bool) -> Settings {
    let mut settings = Settings::from_yaml(
        r#"
interval: 1
jitter_seconds: 0
accounts:
  - email: placeholder@example.com
    password: secret
    world: Glendale
    missions: false
    silver_barter_threshold: 0
    castle: { upgrades: [] }
    fortress: { upgrades: [] }
    city: { upgrades: [] }
"#,
    )
    .unwrap();
    settings.debug = debug;
    settings.screenshots_path = PathBuf::from("shots");
    let template = settings.accounts[0].clone();
    settings.accounts = emails
        .iter()
        .map(|email| AccountConfig {
            email: email.to_string(),
            ..template.clone()
        })
        .collect();
    settings
}

#[tokio::test]
async fn one_failing_account_does_not_stop_the_others() {
    let launcher = FakeLauncher::default()
        .with("first@example.com", broken)
        .with("third@example.com", healthy);
    let run_loop = RunLoop::new(
        settings(
            &["first@example.com", "second@example.com", "third@example.com"],
            true,
        ),
        launcher,
    );

    let outcomes = run_loop.run_pass().await;

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        &outcomes[0],
        AccountOutcome::Failed { email, error }
            if email == "first@example.com" && error.contains("habitat name")
    ));
    assert!(matches!(
        &outcomes[1],
        AccountOutcome::Failed { error, .. } if error.contains("chrome exited")
    ));
    assert!(outcomes[2].is_completed());

    let launcher = run_loop.launcher();
    assert_eq!(
        launcher.opened(),
        vec!["first@example.com", "second@example.com", "third@example.com"]
    );
    // Sessions that opened are always closed, failed or not.
    assert_eq!(launcher.closed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn debug_mode_screenshots_failed_accounts_only() {
    let launcher = FakeLauncher::default()
        .with("first@example.com", broken)
        .with("second@example.com", healthy);
    let run_loop = RunLoop::new(
        settings(&["first@example.com", "second@example.com"], true),
        launcher,
    );

    run_loop.run_pass().await;

    let boards = run_loop.launcher().boards();
    let shots: Vec<String> = boards[0]
        .events()
        .into_iter()
        .filter(|e| e.starts_with("screenshot"))
        .collect();
    assert_eq!(shots.len(), 1);
    assert!(
        shots[0].starts_with("screenshot shots/first@example.com/"),
        "{}",
        shots[0]
    );
    assert!(shots[0].ends_with(".png"));
    assert_eq!(boards[1].count("screenshot"), 0);
}

#[tokio::test]
async fn no_screenshot_without_debug() {
    let launcher = FakeLauncher::default().with("first@example.com", broken);
    let run_loop = RunLoop::new(settings(&["first@example.com"], false), launcher);

    run_loop.run_pass().await;

    assert_eq!(run_loop.launcher().boards()[0].count("screenshot"), 0);
}

#[tokio::test]
async fn once_mode_runs_a_single_pass() {
    let launcher = FakeLauncher::default().with("first@example.com", healthy);
    let run_loop = RunLoop::new(settings(&["first@example.com"], false), launcher);

    run_loop.run(true).await;

    assert_eq!(run_loop.launcher().opened().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn loop_repeats_until_cancelled() {
    let launcher = FakeLauncher::default().with("first@example.com", healthy);
    let run_loop = RunLoop::new(settings(&["first@example.com"], false), launcher).with_pacing(
        Pacing {
            interval: Duration::from_secs(60),
            jitter: Duration::ZERO,
        },
    );

    let cancel = run_loop.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(150)).await;
        cancel.cancel();
    });

    run_loop.run(false).await;

    // Passes at 0s, 60s and 120s; cancelled during the third sleep.
    assert_eq!(run_loop.launcher().opened().len(), 3);
}

#[tokio::test]
async fn cancelled_loop_skips_remaining_accounts() {
    let launcher = FakeLauncher::default().with("first@example.com", healthy);
    let run_loop = RunLoop::new(
        settings(&["first@example.com", "second@example.com"], false),
        launcher,
    );
    run_loop.cancellation_token().cancel();

    let outcomes = run_loop.run_pass().await;

    assert!(outcomes.is_empty());
    assert!(run_loop.launcher().opened().is_empty());
}
