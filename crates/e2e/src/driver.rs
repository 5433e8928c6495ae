//! Browser driver seam
//!
//! Sessions and workflows talk to a [`BrowserDriver`]; the WebDriver client is
//! one implementation, an in-process fake used by tests is another.

use async_trait::async_trait;
use std::fmt;

use crate::error::E2eResult;

/// Semantic element locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Form field by `name` attribute
    Name(String),
    /// `<input>` by `value` attribute (submit buttons)
    InputValue(String),
    /// Any element whose own text, whitespace-normalized, equals this
    ExactText(String),
    Css(String),
    Tag(String),
    Checkbox { name: String, value: String },
}

impl Query {
    /// XPath form of this query; `None` for CSS queries
    pub fn to_xpath(&self) -> Option<String> {
        let xpath = match self {
            Query::Name(name) => format!("//*[@name={}]", xpath_literal(name)),
            Query::InputValue(value) => format!("//input[@value={}]", xpath_literal(value)),
            Query::ExactText(text) => {
                format!("//*[normalize-space(text())={}]", xpath_literal(text))
            }
            Query::Css(_) => return None,
            Query::Tag(tag) => format!("//{}", tag),
            Query::Checkbox { name, value } => format!(
                "//input[@type='checkbox'][@name={}][@value={}]",
                xpath_literal(name),
                xpath_literal(value)
            ),
        };
        Some(xpath)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Name(name) => write!(f, "field named {:?}", name),
            Query::InputValue(value) => write!(f, "button {:?}", value),
            Query::ExactText(text) => write!(f, "text {:?}", text),
            Query::Css(css) => write!(f, "element matching {:?}", css),
            Query::Tag(tag) => write!(f, "<{}> element", tag),
            Query::Checkbox { name, value } => {
                write!(f, "checkbox {:?} with value {:?}", name, value)
            }
        }
    }
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// built with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Handle to an element on the current page
    type Element: Send + Sync;

    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn find_all(&self, query: &Query) -> E2eResult<Vec<Self::Element>>;

    async fn send_keys(&self, element: &Self::Element, keys: &str) -> E2eResult<()>;

    async fn click(&self, element: &Self::Element) -> E2eResult<()>;

    /// Rendered text of the element
    async fn text(&self, element: &Self::Element) -> E2eResult<String>;

    /// Text of the first selected option of a `<select>`
    async fn selected_option_text(&self, element: &Self::Element) -> E2eResult<String>;

    /// PNG of the current viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    async fn quit(&self) -> E2eResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Log in", "'Log in'" ; "plain")]
    #[test_case("Don't", "\"Don't\"" ; "apostrophe")]
    #[test_case("say \"hi\"", "'say \"hi\"'" ; "double quotes")]
    #[test_case("it's \"x\"", "concat('it', \"'\", 's \"x\"')" ; "both quotes")]
    fn test_xpath_literal(input: &str, expected: &str) {
        assert_eq!(xpath_literal(input), expected);
    }

    #[test]
    fn test_query_xpaths() {
        assert_eq!(
            Query::InputValue("Log in".into()).to_xpath().unwrap(),
            "//input[@value='Log in']"
        );
        assert_eq!(
            Query::ExactText("More".into()).to_xpath().unwrap(),
            "//*[normalize-space(text())='More']"
        );
        assert_eq!(
            Query::Checkbox {
                name: "roles".into(),
                value: "3".into()
            }
            .to_xpath()
            .unwrap(),
            "//input[@type='checkbox'][@name='roles'][@value='3']"
        );
        assert_eq!(Query::Css("#id_event".into()).to_xpath(), None);
    }

    #[test]
    fn test_display_names_the_target() {
        assert_eq!(Query::Name("username".into()).to_string(), "field named \"username\"");
        assert_eq!(Query::Tag("body".into()).to_string(), "<body> element");
    }
}
