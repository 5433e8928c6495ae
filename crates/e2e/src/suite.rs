//! Suite runner owning the browser for the length of a run

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::E2eConfig;
use crate::driver::BrowserDriver;
use crate::error::E2eResult;
use crate::process::DriverProcess;
use crate::session::BrowserSession;
use crate::webdriver::WebDriverBrowser;

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl SuiteResult {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write results to `<dir>/test-results.json`
    pub fn write_to(&self, dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join("test-results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// One browser session shared by every test of a run.
///
/// Tests borrow the session through [`Suite::run`]; [`Suite::finish`] closes
/// the browser and stops the driver whatever the tests did.
pub struct Suite<D: BrowserDriver> {
    session: BrowserSession<D>,
    driver_process: Option<DriverProcess>,
    screenshot_dir: PathBuf,
    results: Mutex<Vec<TestResult>>,
    started: Instant,
}

impl Suite<WebDriverBrowser> {
    /// Start (or attach to) a WebDriver server and open the browser
    pub async fn launch(config: &E2eConfig) -> E2eResult<Self> {
        let base_url = config.require_live_server()?.to_string();
        let start = Instant::now();

        let (driver_process, webdriver_url) = match &config.driver.webdriver_url {
            Some(url) => (None, url.clone()),
            None => {
                let process = DriverProcess::spawn(&config.driver).await?;
                let url = process.url().to_string();
                (Some(process), url)
            }
        };

        // On failure the driver process is dropped, which stops it.
        let browser = WebDriverBrowser::connect(&webdriver_url, &config.driver).await?;
        info!("Browser ready in {} ms", start.elapsed().as_millis());

        let session = BrowserSession::new(browser, &base_url, config.routes.clone());
        let mut suite = Self::with_session(session, config.screenshot_dir.clone());
        suite.driver_process = driver_process;
        Ok(suite)
    }
}

impl<D: BrowserDriver> Suite<D> {
    /// Wrap an already-open session
    pub fn with_session(session: BrowserSession<D>, screenshot_dir: PathBuf) -> Self {
        Self {
            session,
            driver_process: None,
            screenshot_dir,
            results: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    pub fn session(&self) -> &BrowserSession<D> {
        &self.session
    }

    /// Run one test against the shared session, then save `<name>.png`.
    ///
    /// Returns whether the test passed.
    pub async fn run<'s, F, Fut>(&'s self, name: &str, test: F) -> bool
    where
        F: FnOnce(&'s BrowserSession<D>) -> Fut,
        Fut: Future<Output = E2eResult<()>> + 's,
    {
        info!("Running {}", name);
        let start = Instant::now();
        let outcome = test(&self.session).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let shot = self.screenshot_dir.join(format!("{}.png", name));
        let screenshot = match self.session.save_screenshot(&shot).await {
            Ok(()) => Some(shot.display().to_string()),
            Err(e) => {
                warn!("Could not save screenshot for {}: {}", name, e);
                None
            }
        };

        let success = outcome.is_ok();
        match &outcome {
            Ok(()) => info!("✓ {} ({} ms)", name, duration_ms),
            Err(e) => error!("✗ {} - {}", name, e),
        }

        self.results.lock().push(TestResult {
            name: name.to_string(),
            success,
            duration_ms,
            error: outcome.err().map(|e| e.to_string()),
            screenshot,
        });
        success
    }

    /// Close the browser, stop the driver and summarize the run
    pub async fn finish(mut self) -> SuiteResult {
        if let Err(e) = self.session.quit().await {
            warn!("Browser did not quit cleanly: {}", e);
        }
        if let Some(mut process) = self.driver_process.take() {
            if let Err(e) = process.stop() {
                warn!("WebDriver did not stop cleanly: {}", e);
            }
        }

        let results = std::mem::take(&mut *self.results.lock());
        let passed = results.iter().filter(|r| r.success).count();
        let duration_ms = self.started.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed,
            results.len() - passed,
            duration_ms
        );

        SuiteResult {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }
}
