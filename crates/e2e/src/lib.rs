//! Amy browser workflow tests
//!
//! Drives a real browser over WebDriver against a running Amy server:
//! - Spawns chromedriver/geckodriver (or attaches to a running one)
//! - Binds the browser to the server URL and its named routes
//! - Runs workflows as a suite that owns the browser for the whole run
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Suite                                                      │
//! │    ├── launch(config) -> DriverProcess + WebDriverBrowser   │
//! │    ├── run(name, |session| workflow) -> pass/fail + .png    │
//! │    └── finish() -> SuiteResult (browser closed, driver down)│
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserSession<D: BrowserDriver>                           │
//! │    ├── go(view_name)                                        │
//! │    ├── fill / click_button / click_text / click_checkbox    │
//! │    ├── selected_option / body_text / save_screenshot        │
//! │    └── find_* -> Lookup { NotFound | Ambiguous(n) | Found } │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod harness;
pub mod lookup;
pub mod process;
pub mod session;
pub mod suite;
pub mod webdriver;
pub mod workflows;

pub use config::{Browser, Credentials, DriverConfig, E2eConfig};
pub use driver::{BrowserDriver, Query};
pub use error::{E2eError, E2eResult};
pub use lookup::Lookup;
pub use session::BrowserSession;
pub use suite::{Suite, SuiteResult, TestResult};
pub use webdriver::WebDriverBrowser;
