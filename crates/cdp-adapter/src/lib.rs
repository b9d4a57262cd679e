//! Chromium DevTools Protocol adapter.
//!
//! Launches (or attaches to) a Chromium instance, keeps a single command loop per browser
//! and exposes the small page-level surface that the action layer drives: page creation,
//! navigation, script evaluation, raw input events and screenshots.

use std::{env, path::PathBuf};
use which::which;

pub mod adapter;
pub mod commands;
pub mod registry;
pub mod transport;
mod util;

pub use adapter::{Cdp, CdpAdapter};
pub use commands::{MouseEventKind, ScreenshotOptions};
pub use config::CdpConfig;
pub use error::{AdapterError, AdapterErrorKind};
pub use ids::PageId;

pub mod ids {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    /// Unique identifier for a page/tab.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
    pub struct PageId(pub Uuid);

    impl PageId {
        pub fn new() -> Self {
            Self(Uuid::new_v4())
        }
    }

    impl Default for PageId {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub mod error {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use thiserror::Error;

    /// High-level error categories surfaced by the adapter.
    #[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AdapterErrorKind {
        #[error("navigation timed out")]
        NavTimeout,
        #[error("cdp i/o failure")]
        CdpIo,
        #[error("internal error")]
        Internal,
    }

    /// Error kind plus a human-readable hint for logs.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AdapterError {
        pub kind: AdapterErrorKind,
        pub hint: Option<String>,
    }

    impl fmt::Display for AdapterError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.kind)?;
            if let Some(hint) = &self.hint {
                write!(f, ": {}", hint)?;
            }
            Ok(())
        }
    }

    impl std::error::Error for AdapterError {}

    impl AdapterError {
        pub fn new(kind: AdapterErrorKind) -> Self {
            Self { kind, hint: None }
        }

        pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
            self.hint = Some(hint.into());
            self
        }
    }
}

pub mod config {
    use crate::detect_chrome_executable;
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    /// Configuration for launching and tuning the adapter.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CdpConfig {
        pub executable: PathBuf,
        pub user_data_dir: PathBuf,
        pub headless: bool,
        /// Upper bound for a single CDP round-trip.
        pub default_deadline_ms: u64,
        pub no_sandbox: bool,
    }

    impl Default for CdpConfig {
        fn default() -> Self {
            Self {
                executable: detect_chrome_executable().unwrap_or_default(),
                user_data_dir: Path::new("./profiles/default").into(),
                headless: true,
                default_deadline_ms: 30_000,
                no_sandbox: false,
            }
        }
    }

    impl CdpConfig {
        /// Config for a persistent per-profile browser.
        pub fn for_profile(user_data_dir: impl Into<PathBuf>, headless: bool) -> Self {
            Self {
                user_data_dir: user_data_dir.into(),
                headless,
                ..Self::default()
            }
        }

        pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
            if let Some(path) = executable {
                self.executable = path;
            }
            self
        }
    }
}

fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("CASTELLAN_CHROME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    let skip_defaults = env::var("CASTELLAN_SKIP_OS_PATHS")
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    if !skip_defaults {
        for candidate in os_specific_chrome_paths() {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(value) = env::var(key) {
                let root = PathBuf::from(value.trim());
                paths.push(root.join("Google/Chrome/Application/chrome.exe"));
                paths.push(root.join("Chromium/Application/chrome.exe"));
            }
        }
        paths
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{config::CdpConfig, detect_chrome_executable};
    use std::{env, fs};
    use tempfile::tempdir;

    #[test]
    fn detects_from_env_var() {
        let dir = tempdir().unwrap();
        let exe_path = dir.path().join("my-chrome");
        fs::write(&exe_path, b"").unwrap();
        let original = env::var("CASTELLAN_CHROME").ok();
        env::set_var("CASTELLAN_CHROME", exe_path.to_string_lossy().to_string());
        let detected = detect_chrome_executable();
        if let Some(value) = original {
            env::set_var("CASTELLAN_CHROME", value);
        } else {
            env::remove_var("CASTELLAN_CHROME");
        }
        assert_eq!(detected, Some(exe_path));
    }

    #[test]
    fn profile_config_keeps_explicit_executable() {
        let cfg = CdpConfig::for_profile("profiles/a@b.c", false)
            .with_executable(Some("/opt/chrome".into()));
        assert!(!cfg.headless);
        assert_eq!(cfg.user_data_dir.to_string_lossy(), "profiles/a@b.c");
        assert_eq!(cfg.executable.to_string_lossy(), "/opt/chrome");

        let untouched = CdpConfig::for_profile("p", true).with_executable(None);
        assert!(untouched.headless);
    }
}
