//! WebDriver-backed browser

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::{Browser, DriverConfig};
use crate::driver::{BrowserDriver, Query};
use crate::error::E2eResult;

/// Browser controlled through a WebDriver server
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Open a browser session on the WebDriver server at `webdriver_url`
    pub async fn connect(webdriver_url: &str, config: &DriverConfig) -> E2eResult<Self> {
        info!(
            "Opening {} session via {}",
            config.browser.name(),
            webdriver_url
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(webdriver_url)
            .await?;
        client
            .set_window_size(config.window_width, config.window_height)
            .await?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn capabilities(config: &DriverConfig) -> Map<String, Value> {
    let mut caps = Map::new();
    let mut args: Vec<&str> = Vec::new();

    match config.browser {
        Browser::Chrome => {
            if config.headless {
                args.extend(["--headless=new", "--disable-gpu", "--no-sandbox"]);
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        Browser::Firefox => {
            if config.headless {
                args.push("-headless");
            }
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }

    caps
}

#[async_trait]
impl BrowserDriver for WebDriverBrowser {
    type Element = Element;

    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("GET {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn find_all(&self, query: &Query) -> E2eResult<Vec<Element>> {
        let found = match (query, query.to_xpath()) {
            (Query::Css(css), _) => self.client.find_all(Locator::Css(css)).await?,
            (_, Some(xpath)) => self.client.find_all(Locator::XPath(&xpath)).await?,
            (_, None) => Vec::new(),
        };
        debug!("{} -> {} match(es)", query, found.len());
        Ok(found)
    }

    async fn send_keys(&self, element: &Element, keys: &str) -> E2eResult<()> {
        element.send_keys(keys).await?;
        Ok(())
    }

    async fn click(&self, element: &Element) -> E2eResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> E2eResult<String> {
        Ok(element.text().await?)
    }

    async fn selected_option_text(&self, element: &Element) -> E2eResult<String> {
        let option = element.find(Locator::Css("option:checked")).await?;
        Ok(option.text().await?)
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    async fn quit(&self) -> E2eResult<()> {
        info!("Closing browser session");
        self.client.clone().close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_chrome_capabilities() {
        let caps = capabilities(&DriverConfig::default());
        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_headed_firefox_has_no_headless_flag() {
        let config = DriverConfig {
            browser: Browser::Firefox,
            headless: false,
            ..Default::default()
        };
        let caps = capabilities(&config);
        assert_eq!(caps["browserName"], "firefox");
        assert!(caps["moz:firefoxOptions"]["args"].as_array().unwrap().is_empty());
    }
}
