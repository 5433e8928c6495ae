//! Configuration for browser workflow runs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Overrides `E2eConfig::live_server_url`
pub const LIVE_SERVER_URL_ENV: &str = "AMY_LIVE_SERVER_URL";

/// Overrides `DriverConfig::webdriver_url`
pub const WEBDRIVER_URL_ENV: &str = "AMY_WEBDRIVER_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
}

impl Browser {
    /// WebDriver server binary for this browser
    pub fn driver_binary(&self) -> &'static str {
        match self {
            Browser::Chrome => "chromedriver",
            Browser::Firefox => "geckodriver",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chrome" | "chromium" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            other => Err(E2eError::Config(format!("unsupported browser: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub browser: Browser,

    /// WebDriver server binary; `None` uses the browser's default on PATH
    pub binary_path: Option<PathBuf>,

    /// Use an already-running WebDriver server instead of spawning one
    pub webdriver_url: Option<String>,

    /// Port for a spawned driver (None = find a free port)
    pub port: Option<u16>,

    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub startup_timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chrome,
            binary_path: None,
            webdriver_url: None,
            port: None,
            headless: true,
            window_width: 1280,
            window_height: 500,
            startup_timeout_secs: 30,
        }
    }
}

impl DriverConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn binary(&self) -> PathBuf {
        self.binary_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.browser.driver_binary()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Base URL of the running server, without a trailing slash
    pub live_server_url: Option<String>,

    pub credentials: Credentials,

    /// View name to path, e.g. `login` -> `/account/login/`
    pub routes: BTreeMap<String, String>,

    pub screenshot_dir: PathBuf,
    pub results_dir: PathBuf,
    pub driver: DriverConfig,
}

impl Default for E2eConfig {
    fn default() -> Self {
        let routes = [
            ("login", "/account/login/"),
            ("admin-dashboard", "/dashboard/admin/"),
        ]
        .into_iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect();

        Self {
            live_server_url: None,
            credentials: Credentials::default(),
            routes,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            results_dir: PathBuf::from("test-results"),
            driver: DriverConfig::default(),
        }
    }
}

impl E2eConfig {
    /// Load from TOML (defaults when the file is absent), then apply env overrides
    pub fn load(path: &Path) -> E2eResult<Self> {
        let mut config = if path.exists() {
            Self::from_toml(&std::fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| E2eError::Config(e.to_string()))?;
        if config.driver.window_width == 0 || config.driver.window_height == 0 {
            return Err(E2eError::Config("window size must be non-zero".to_string()));
        }
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(LIVE_SERVER_URL_ENV).filter(|v| !v.is_empty()) {
            self.live_server_url = Some(url);
        }
        if let Some(url) = lookup(WEBDRIVER_URL_ENV).filter(|v| !v.is_empty()) {
            self.driver.webdriver_url = Some(url);
        }
    }

    /// The live server URL, or a config error when none is set
    pub fn require_live_server(&self) -> E2eResult<&str> {
        self.live_server_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| {
                E2eError::Config(format!("no live server URL (set {})", LIVE_SERVER_URL_ENV))
            })
    }
}
