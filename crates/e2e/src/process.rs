//! WebDriver server process - spawning and health checking chromedriver/geckodriver

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DriverConfig;
use crate::error::{E2eError, E2eResult};

/// Handle to a running WebDriver server
pub struct DriverProcess {
    child: Child,
    pub url: String,
    pub port: u16,
}

impl DriverProcess {
    /// Spawn the configured driver binary and wait until it reports ready
    pub async fn spawn(config: &DriverConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let url = format!("http://127.0.0.1:{}", port);
        let binary = config.binary();

        info!("Spawning {} on port {}", binary.display(), port);

        let child = Command::new(&binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                E2eError::DriverStartup(format!("Failed to spawn {}: {}", binary.display(), e))
            })?;

        let process = DriverProcess { child, url, port };
        process.wait_for_ready(config.startup_timeout()).await?;

        info!("WebDriver is ready at {}", process.url);
        Ok(process)
    }

    /// Poll `/status` until the driver reports `ready`
    async fn wait_for_ready(&self, timeout: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: serde_json::Value = resp.json().await?;
                    if body["value"]["ready"].as_bool().unwrap_or(true) {
                        return Ok(());
                    }
                }
                Ok(resp) => {
                    warn!("Status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver to start...");
                    }
                    // Connection refused is expected while the driver starts
                    if !e.is_connect() {
                        warn!("Status check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the driver: SIGTERM first, then kill
    pub fn stop(&mut self) -> E2eResult<()> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }
        info!("Stopping WebDriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = self.child.kill();
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Find a free port to use
pub fn find_free_port() -> std::io::Result<u16> {
    use std::net::TcpListener;

    Ok(TcpListener::bind("127.0.0.1:0")?.local_addr()?.port())
}
