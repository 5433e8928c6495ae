//! A browser bound to a live server and its routes

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::driver::{BrowserDriver, Query};
use crate::error::{E2eError, E2eResult};
use crate::lookup::Lookup;

pub struct BrowserSession<D: BrowserDriver> {
    driver: D,
    base_url: String,
    routes: BTreeMap<String, String>,
}

impl<D: BrowserDriver> BrowserSession<D> {
    pub fn new(driver: D, base_url: &str, routes: BTreeMap<String, String>) -> Self {
        Self {
            driver,
            base_url: base_url.trim_end_matches('/').to_string(),
            routes,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a named view
    pub fn url_for(&self, view_name: &str) -> E2eResult<String> {
        let path = self
            .routes
            .get(view_name)
            .ok_or_else(|| E2eError::UnknownRoute(view_name.to_string()))?;
        Ok(format!("{}{}", self.base_url, path))
    }

    /// Navigate to a named view
    pub async fn go(&self, view_name: &str) -> E2eResult<()> {
        let url = self.url_for(view_name)?;
        info!("go {} ({})", view_name, url);
        self.driver.goto(&url).await
    }

    pub async fn find(&self, query: &Query) -> E2eResult<Lookup<D::Element>> {
        Ok(Lookup::from_matches(self.driver.find_all(query).await?))
    }

    pub async fn find_field(&self, name: &str) -> E2eResult<Lookup<D::Element>> {
        self.find(&Query::Name(name.to_string())).await
    }

    pub async fn find_button(&self, text: &str) -> E2eResult<Lookup<D::Element>> {
        self.find(&Query::InputValue(text.to_string())).await
    }

    pub async fn find_text(&self, text: &str) -> E2eResult<Lookup<D::Element>> {
        self.find(&Query::ExactText(text.to_string())).await
    }

    pub async fn find_checkbox(&self, name: &str, value: &str) -> E2eResult<Lookup<D::Element>> {
        self.find(&Query::Checkbox {
            name: name.to_string(),
            value: value.to_string(),
        })
        .await
    }

    /// Exactly one match, else `ElementNotFound` / `AmbiguousElement`
    async fn require(&self, query: Query) -> E2eResult<D::Element> {
        let what = query.to_string();
        self.find(&query).await?.require(&what)
    }

    /// First match in document order
    async fn first(&self, query: Query) -> E2eResult<D::Element> {
        self.driver
            .find_all(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::ElementNotFound(query.to_string()))
    }

    /// Type `value` into the form field called `name`
    pub async fn fill(&self, name: &str, value: &str) -> E2eResult<()> {
        debug!("fill {}", name);
        let field = self.first(Query::Name(name.to_string())).await?;
        self.driver.send_keys(&field, value).await
    }

    /// Click the single `<input>` whose value is `text`
    pub async fn click_button(&self, text: &str) -> E2eResult<()> {
        debug!("click button {:?}", text);
        let button = self.require(Query::InputValue(text.to_string())).await?;
        self.driver.click(&button).await
    }

    /// Click the single element whose own text is `text`
    pub async fn click_text(&self, text: &str) -> E2eResult<()> {
        debug!("click text {:?}", text);
        let element = self.require(Query::ExactText(text.to_string())).await?;
        self.driver.click(&element).await
    }

    pub async fn click_checkbox(&self, name: &str, value: &str) -> E2eResult<()> {
        debug!("click checkbox {}={}", name, value);
        let checkbox = self
            .first(Query::Checkbox {
                name: name.to_string(),
                value: value.to_string(),
            })
            .await?;
        self.driver.click(&checkbox).await
    }

    /// Text of the selected option in the `<select>` matching `css`
    pub async fn selected_option(&self, css: &str) -> E2eResult<String> {
        let select = self.first(Query::Css(css.to_string())).await?;
        self.driver.selected_option_text(&select).await
    }

    pub async fn body_text(&self) -> E2eResult<String> {
        let body = self.first(Query::Tag("body".to_string())).await?;
        self.driver.text(&body).await
    }

    pub async fn save_screenshot(&self, path: &Path) -> E2eResult<()> {
        let png = self.driver.screenshot().await?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, png)?;
        debug!("Screenshot saved to {}", path.display());
        Ok(())
    }

    pub async fn quit(&self) -> E2eResult<()> {
        self.driver.quit().await
    }
}
