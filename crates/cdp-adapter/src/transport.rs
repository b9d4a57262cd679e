//! Browser process and DevTools websocket.
//!
//! One [`ChromiumTransport`] owns one Chromium child for the lifetime of an
//! account session. Commands are funnelled through a channel into a single
//! pump task that owns the websocket, submits requests and routes replies
//! back by call id. Events are not consumed.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::async_process::Child;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::cdp::browser_protocol::target::SessionId as CdpSessionId;
use chromiumoxide::cdp::events::CdpEventMessage;
use chromiumoxide::conn::Connection;
use chromiumoxide_types::{CallId, Message, Response};
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CdpConfig;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::util::extract_ws_url;

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);

const CHROME_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-sync",
    "--no-first-run",
    "--no-default-browser-check",
    "--password-store=basic",
    "--remote-allow-origins=*",
];

/// Where a command is addressed: the browser itself or a flattened page session.
#[derive(Clone, Debug)]
pub enum CommandTarget {
    Browser,
    Session(String),
}

#[async_trait]
pub trait CdpTransport: Send + Sync {
    /// Launch the browser and connect. Calling it on a live transport is a no-op.
    async fn start(&self) -> Result<(), AdapterError>;

    async fn send_command(
        &self,
        target: CommandTarget,
        method: &str,
        params: Value,
    ) -> Result<Value, AdapterError>;

    /// Drop the connection and kill the browser process, if any.
    async fn stop(&self);
}

type Reply = oneshot::Sender<Result<Value, AdapterError>>;

struct Request {
    target: CommandTarget,
    method: String,
    params: Value,
    reply: Reply,
}

/// A connected browser: the request channel into the pump and the process behind it.
struct Link {
    requests: mpsc::Sender<Request>,
    pump: JoinHandle<()>,
    child: Option<Child>,
}

impl Link {
    fn is_open(&self) -> bool {
        !self.pump.is_finished() && !self.requests.is_closed()
    }

    async fn close(mut self) {
        self.pump.abort();
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill().await {
                warn!(target: "cdp-transport", %err, "failed to kill chromium");
            }
        }
    }
}

/// Transport that launches a local Chromium from a [`CdpConfig`].
pub struct ChromiumTransport {
    cfg: CdpConfig,
    link: Mutex<Option<Link>>,
}

impl ChromiumTransport {
    pub fn new(cfg: CdpConfig) -> Self {
        Self {
            cfg,
            link: Mutex::new(None),
        }
    }

    fn command_deadline(&self) -> Duration {
        Duration::from_millis(self.cfg.default_deadline_ms)
    }

    async fn connect(&self) -> Result<Link, AdapterError> {
        let mut child = launch_options(&self.cfg)?.launch().map_err(|err| {
            AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint(format!("failed to launch chromium: {err}"))
        })?;
        let ws_url = match extract_ws_url(&mut child, LAUNCH_TIMEOUT).await {
            Ok(url) => url,
            Err(err) => {
                let _ = child.kill().await;
                return Err(AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string()));
            }
        };
        let conn = match Connection::<CdpEventMessage>::connect(&ws_url).await {
            Ok(conn) => conn,
            Err(err) => {
                let _ = child.kill().await;
                return Err(AdapterError::new(AdapterErrorKind::CdpIo)
                    .with_hint(format!("devtools connect failed: {err}")));
            }
        };

        let (requests, inbox) = mpsc::channel(64);
        let pump = tokio::spawn(pump(conn, inbox));
        info!(target: "cdp-transport", url = %ws_url, "connected to chromium");
        Ok(Link {
            requests,
            pump,
            child: Some(child),
        })
    }

    async fn sender(&self) -> Result<mpsc::Sender<Request>, AdapterError> {
        match self.link.lock().await.as_ref() {
            Some(link) if link.is_open() => Ok(link.requests.clone()),
            Some(_) => Err(connection_closed()),
            None => Err(AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint("browser has not been started")),
        }
    }
}

#[async_trait]
impl CdpTransport for ChromiumTransport {
    async fn start(&self) -> Result<(), AdapterError> {
        let mut guard = self.link.lock().await;
        if guard.as_ref().is_some_and(Link::is_open) {
            return Ok(());
        }
        if let Some(stale) = guard.take() {
            stale.close().await;
        }
        *guard = Some(self.connect().await?);
        Ok(())
    }

    async fn send_command(
        &self,
        target: CommandTarget,
        method: &str,
        params: Value,
    ) -> Result<Value, AdapterError> {
        let requests = self.sender().await?;
        let (reply, answer) = oneshot::channel();
        requests
            .send(Request {
                target,
                method: method.to_string(),
                params,
                reply,
            })
            .await
            .map_err(|_| connection_closed())?;

        let deadline = self.command_deadline();
        match tokio::time::timeout(deadline, answer).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(connection_closed()),
            Err(_) => Err(AdapterError::new(AdapterErrorKind::CdpIo).with_hint(format!(
                "{method} got no reply within {}ms",
                deadline.as_millis()
            ))),
        }
    }

    async fn stop(&self) {
        let link = self.link.lock().await.take();
        if let Some(link) = link {
            link.close().await;
            debug!(target: "cdp-transport", "chromium stopped");
        }
    }
}

fn connection_closed() -> AdapterError {
    AdapterError::new(AdapterErrorKind::CdpIo).with_hint("browser connection closed")
}

fn launch_options(cfg: &CdpConfig) -> Result<BrowserConfig, AdapterError> {
    if !cfg.executable.as_os_str().is_empty() && !cfg.executable.exists() {
        return Err(AdapterError::new(AdapterErrorKind::CdpIo).with_hint(format!(
            "chrome executable not found at {}; set CASTELLAN_CHROME or chrome_path",
            cfg.executable.display()
        )));
    }
    let profile = match cfg.user_data_dir.is_absolute() {
        true => cfg.user_data_dir.clone(),
        false => std::env::current_dir()
            .map_err(|err| {
                AdapterError::new(AdapterErrorKind::Internal)
                    .with_hint(format!("cannot resolve profile path: {err}"))
            })?
            .join(&cfg.user_data_dir),
    };

    let mut args = CHROME_ARGS.to_vec();
    if cfg.headless {
        args.push("--headless=new");
    }
    let mut builder = BrowserConfig::builder()
        .request_timeout(Duration::from_millis(cfg.default_deadline_ms))
        .launch_timeout(LAUNCH_TIMEOUT)
        .user_data_dir(profile)
        .args(args);
    if !cfg.headless {
        builder = builder.with_head();
    }
    if cfg.no_sandbox {
        builder = builder.no_sandbox();
    }
    if !cfg.executable.as_os_str().is_empty() {
        builder = builder.chrome_executable(cfg.executable.clone());
    }
    builder.build().map_err(|err| {
        AdapterError::new(AdapterErrorKind::Internal).with_hint(format!("browser config: {err}"))
    })
}

/// Owns the websocket until either side goes away, then fails whatever is still waiting.
async fn pump(mut conn: Connection<CdpEventMessage>, mut inbox: mpsc::Receiver<Request>) {
    let mut waiting: HashMap<CallId, Reply> = HashMap::new();
    let reason = loop {
        tokio::select! {
            request = inbox.recv() => {
                let Some(request) = request else {
                    break connection_closed();
                };
                let session = match request.target {
                    CommandTarget::Browser => None,
                    CommandTarget::Session(id) => Some(CdpSessionId::from(id)),
                };
                match conn.submit_command(request.method.into(), session, request.params) {
                    Ok(call) => {
                        waiting.insert(call, request.reply);
                    }
                    Err(err) => {
                        let err = AdapterError::new(AdapterErrorKind::CdpIo)
                            .with_hint(format!("failed to encode command: {err}"));
                        let _ = request.reply.send(Err(err));
                    }
                }
            }
            message = conn.next() => match message {
                Some(Ok(Message::Response(response))) => {
                    if let Some(reply) = waiting.remove(&response.id) {
                        let _ = reply.send(payload(response));
                    }
                }
                Some(Ok(Message::Event(_))) => {}
                Some(Err(err)) => {
                    warn!(target: "cdp-transport", %err, "devtools connection failed");
                    break AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string());
                }
                None => {
                    debug!(target: "cdp-transport", "devtools connection closed by browser");
                    break connection_closed();
                }
            },
        }
    };
    for (_, reply) in waiting.drain() {
        let _ = reply.send(Err(reason.clone()));
    }
}

fn payload(response: Response) -> Result<Value, AdapterError> {
    match (response.result, response.error) {
        (Some(result), _) => Ok(result),
        (None, Some(error)) => Err(AdapterError::new(AdapterErrorKind::CdpIo)
            .with_hint(format!("cdp error {}: {}", error.code, error.message))),
        (None, None) => Ok(Value::Null),
    }
}
