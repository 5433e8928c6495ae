//! Base test case: a fresh store with fixtures, plus the page checks

use std::path::Path;

use amy_common::{Database, Fixtures};

use crate::config::ValidatorConfig;
use crate::error::CheckResult;
use crate::render::{Context, Template};
use crate::tree::{Document, Element, QueryAll};
use crate::validator::{self, HttpResponse, ResponseValidator};

/// Per-test state. `label` names any error artifact the test produces.
pub struct TestCase {
    label: String,
    db: Database,
    fixtures: Fixtures,
    validator: ResponseValidator,
}

impl TestCase {
    /// In-memory store seeded with the baseline fixtures and default checks
    pub fn setup(label: &str) -> CheckResult<Self> {
        Self::with_config(label, ValidatorConfig::default())
    }

    pub fn with_config(label: &str, config: ValidatorConfig) -> CheckResult<Self> {
        let db = Database::open_memory()?;
        let fixtures = Fixtures::seed(&db)?;
        Ok(Self {
            label: label.to_string(),
            db,
            fixtures,
            validator: ResponseValidator::new(config),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub fn validator(&self) -> &ResponseValidator {
        &self.validator
    }

    pub fn parse(&self, content: &str) -> CheckResult<Document> {
        self.validator.parse(content, &self.label)
    }

    pub fn parse_with_debug(&self, content: &str, debug_path: &Path) -> CheckResult<Document> {
        self.validator
            .parse_with_debug(content, &self.label, Some(debug_path))
    }

    pub fn check_status_and_parse<R: HttpResponse + ?Sized>(
        &self,
        response: &R,
        expected: u16,
    ) -> CheckResult<Document> {
        self.validator
            .check_status_and_parse(response, expected, &self.label)
    }

    pub fn assert_none<Q: QueryAll + ?Sized>(&self, tree: &Q, selector: &str, message: &str) -> CheckResult<()> {
        validator::assert_none(tree, selector, message)
    }

    pub fn get_one<'d, Q: QueryAll + ?Sized>(
        &self,
        tree: &'d Q,
        selector: &str,
        message: &str,
    ) -> CheckResult<Element<'d>> {
        validator::get_one(tree, selector, message)
    }

    pub fn get_matches<'d, Q: QueryAll + ?Sized>(
        &self,
        tree: &'d Q,
        selector: &str,
        message: &str,
        expected: Option<usize>,
    ) -> CheckResult<Vec<Element<'d>>> {
        validator::get_matches(tree, selector, message, expected)
    }

    /// Render a page the way the server would, with this case's sentinel
    pub fn render(&self, template: &Template, context: &Context) -> String {
        template.render(context, &self.validator.config().sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amy_common::Table;

    #[test]
    fn test_setup_seeds_store() {
        let case = TestCase::setup("test_setup_seeds_store").unwrap();
        assert_eq!(case.label(), "test_setup_seeds_store");
        assert_eq!(case.db().count(Table::Persons).unwrap(), 3);
        assert_eq!(case.fixtures().instructor.name, "instructor");
    }

    #[test]
    fn test_cases_do_not_share_state() {
        let first = TestCase::setup("first").unwrap();
        let second = TestCase::setup("second").unwrap();
        assert_eq!(first.db().count(Table::Sites).unwrap(), 2);
        assert_eq!(second.db().count(Table::Sites).unwrap(), 2);
    }
}
