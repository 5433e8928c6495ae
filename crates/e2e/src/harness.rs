//! Command line of the live browser harness
//!
//! The harness runs as a `harness = false` test binary, so `cargo test` hands
//! it libtest arguments (name filters, `--exact`, `--nocapture`, ...). Only the
//! options below are kept; everything else is dropped before parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Browser, E2eConfig};
use crate::error::E2eResult;

#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "amy-e2e")]
#[command(about = "Browser workflow tests for Amy")]
pub struct HarnessArgs {
    /// Config file (TOML); defaults apply when absent
    #[arg(short, long, default_value = "e2e.toml")]
    pub config: PathBuf,

    /// Base URL of the running server
    #[arg(long, env = "AMY_LIVE_SERVER_URL")]
    pub live_server_url: Option<String>,

    /// Already-running WebDriver server to use instead of spawning one
    #[arg(long, env = "AMY_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Browser to use (chrome, firefox)
    #[arg(long)]
    pub browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Run only the named test
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output directory for results and screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

const VALUE_OPTIONS: &[&str] = &[
    "-c",
    "--config",
    "--live-server-url",
    "--webdriver-url",
    "--browser",
    "-n",
    "--name",
    "-o",
    "--output",
];

const FLAG_OPTIONS: &[&str] = &["--headed"];

/// Keep the program name and the harness's own options, in order.
pub fn own_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut kept: Vec<String> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let key = arg.split_once('=').map_or(arg.as_str(), |(k, _)| k);
        if FLAG_OPTIONS.contains(&arg.as_str()) {
            kept.push(arg);
        } else if VALUE_OPTIONS.contains(&key) {
            let inline = key.len() < arg.len();
            kept.push(arg);
            if !inline {
                if let Some(value) = args.next() {
                    kept.push(value);
                }
            }
        }
    }
    kept
}

impl HarnessArgs {
    /// Parse, ignoring arguments that belong to the test runner
    pub fn parse_lenient<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse_from(own_args(args))
    }

    /// Load the config file and apply command line overrides
    pub fn to_config(&self) -> E2eResult<E2eConfig> {
        let mut config = E2eConfig::load(&self.config)?;
        if let Some(url) = &self.live_server_url {
            config.live_server_url = Some(url.clone());
        }
        if let Some(url) = &self.webdriver_url {
            config.driver.webdriver_url = Some(url.clone());
        }
        if let Some(browser) = &self.browser {
            config.driver.browser = browser.parse::<Browser>()?;
        }
        if self.headed {
            config.driver.headless = false;
        }
        if let Some(output) = &self.output {
            config.screenshot_dir = output.join("screenshots");
            config.results_dir = output.clone();
        }
        Ok(config)
    }

    /// Whether the test called `test` should run
    pub fn wants(&self, test: &str) -> bool {
        self.name.as_deref().map_or(true, |n| n == test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("e2e")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test_case(&["login"] ; "name filter")]
    #[test_case(&["--exact", "test_login"] ; "exact filter")]
    #[test_case(&["--ignored", "--list"] ; "listing")]
    #[test_case(&["--nocapture", "--test-threads", "1"] ; "runner options")]
    #[test_case(&["--format=terse", "--skip", "tasks"] ; "format and skip")]
    fn test_runner_arguments_are_dropped(extra: &[&str]) {
        assert_eq!(own_args(argv(extra)), argv(&[]));
    }

    #[test]
    fn test_own_options_survive_among_runner_arguments() {
        let kept = own_args(argv(&[
            "login",
            "--browser",
            "firefox",
            "--exact",
            "--output=out",
            "--headed",
            "-n",
            "test_tasks",
        ]));
        assert_eq!(
            kept,
            argv(&["--browser", "firefox", "--output=out", "--headed", "-n", "test_tasks"])
        );
    }

    #[test]
    fn test_parse_lenient_reads_own_options() {
        let args = HarnessArgs::parse_lenient(argv(&[
            "test_login",
            "--exact",
            "--name",
            "test_login",
            "--webdriver-url=http://127.0.0.1:4444",
        ]));
        assert_eq!(args.name.as_deref(), Some("test_login"));
        assert_eq!(args.webdriver_url.as_deref(), Some("http://127.0.0.1:4444"));
        assert!(args.wants("test_login"));
        assert!(!args.wants("test_tasks"));
        assert_eq!(args.config, PathBuf::from("e2e.toml"));
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = HarnessArgs {
            config: dir.path().join("absent.toml"),
            live_server_url: Some("http://127.0.0.1:8000".to_string()),
            browser: Some("firefox".to_string()),
            headed: true,
            output: Some(dir.path().join("out")),
            ..Default::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.require_live_server().unwrap(), "http://127.0.0.1:8000");
        assert_eq!(config.driver.browser, Browser::Firefox);
        assert!(!config.driver.headless);
        assert_eq!(config.screenshot_dir, dir.path().join("out").join("screenshots"));
        assert!(args.wants("test_tasks"));
    }
}
