//! Checks on server-rendered pages
//!
//! A page goes through three gates before tests can query it: no unrendered
//! template placeholders, the sanitizing rewrites, and a strict XML parse.
//! When the parse fails, the original page is kept under the error directory
//! as `<label>.html` so the failure can be inspected after the run.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::error::{CheckError, CheckResult};
use crate::sanitize::{find_placeholders, sanitize};
use crate::selector::Selector;
use crate::tree::{Document, Element, QueryAll};

/// Anything carrying an HTTP status and a text body
pub trait HttpResponse {
    fn status_code(&self) -> u16;
    fn body(&self) -> &str;
}

/// A fully buffered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

impl HttpResponse for Response {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn body(&self) -> &str {
        &self.body
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseValidator {
    config: ValidatorConfig,
}

impl ResponseValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Sanitize and parse a page. `label` names the error artifact.
    pub fn parse(&self, content: &str, label: &str) -> CheckResult<Document> {
        self.parse_with_debug(content, label, None)
    }

    /// Like [`parse`](Self::parse), first writing the raw page to `debug_path`.
    pub fn parse_with_debug(
        &self,
        content: &str,
        label: &str,
        debug_path: Option<&Path>,
    ) -> CheckResult<Document> {
        if let Some(path) = debug_path {
            std::fs::write(path, content)?;
            debug!("Saved raw page for {} to {}", label, path.display());
        }

        let hits = find_placeholders(content, &self.config.sentinel);
        if !hits.is_empty() {
            return Err(CheckError::UnrenderedPlaceholder {
                sentinel: self.config.sentinel.clone(),
                hits,
            });
        }

        let sanitized = sanitize(content);
        match Document::parse(&sanitized) {
            Ok(doc) => {
                debug!("Parsed page for {} ({} elements)", label, doc.len());
                Ok(doc)
            }
            Err(e) => {
                let saved_to = self.save_failed_page(content, label)?;
                warn!("HTML parsing failed for {}: {}", label, e);
                Err(CheckError::Parse {
                    reason: e.to_string(),
                    saved_to,
                })
            }
        }
    }

    /// Fail on an unexpected status without parsing; otherwise parse the body.
    pub fn check_status_and_parse<R: HttpResponse + ?Sized>(
        &self,
        response: &R,
        expected: u16,
        label: &str,
    ) -> CheckResult<Document> {
        let actual = response.status_code();
        if actual != expected {
            return Err(CheckError::StatusMismatch { actual, expected });
        }
        self.parse(response.body(), label)
    }

    fn save_failed_page(&self, content: &str, label: &str) -> CheckResult<PathBuf> {
        check_label(label)?;

        let dir = &self.config.error_dir;
        if !dir.is_dir() {
            std::fs::create_dir_all(dir)?;
        }
        let path = dir.join(format!("{}.html", label));
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Labels become file names, so they must be a single plain path component.
fn check_label(label: &str) -> CheckResult<()> {
    let bad = label.is_empty()
        || label == "."
        || label == ".."
        || label.contains(['/', '\\', '\0']);
    if bad {
        return Err(CheckError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

/// Fail if `selector` matches anything.
pub fn assert_none<Q: QueryAll + ?Sized>(tree: &Q, selector: &str, message: &str) -> CheckResult<()> {
    let selector = Selector::parse(selector)?;
    let n = tree.query_all(&selector).len();
    if n != 0 {
        return Err(CheckError::count_got(message, n));
    }
    Ok(())
}

/// The single node `selector` matches; fail on zero or several.
pub fn get_one<'d, Q: QueryAll + ?Sized>(
    tree: &'d Q,
    selector: &str,
    message: &str,
) -> CheckResult<Element<'d>> {
    let selector = Selector::parse(selector)?;
    let mut nodes = tree.query_all(&selector);
    if nodes.len() != 1 {
        return Err(CheckError::count_got(message, nodes.len()));
    }
    Ok(nodes.remove(0))
}

/// All nodes `selector` matches, checking the count when one is given.
pub fn get_matches<'d, Q: QueryAll + ?Sized>(
    tree: &'d Q,
    selector: &str,
    message: &str,
    expected: Option<usize>,
) -> CheckResult<Vec<Element<'d>>> {
    let selector = Selector::parse(selector)?;
    let nodes = tree.query_all(&selector);
    if let Some(expected) = expected {
        if nodes.len() != expected {
            return Err(CheckError::count_expected(message, expected, nodes.len()));
        }
    }
    Ok(nodes)
}
