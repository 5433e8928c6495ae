//! Amy test kit
//!
//! Base test case and checks for server-rendered pages:
//!
//! - [`TestCase`] opens a private store seeded with the baseline fixtures
//! - [`ResponseValidator`] rejects pages with unrendered placeholders, cleans
//!   them up for a strict XML parser and builds a queryable [`Document`]
//! - [`assert_none`], [`get_one`] and [`get_matches`] query a document with
//!   path [`Selector`]s and fail with readable messages
//!
//! ```no_run
//! use amy_testkit::{get_one, Response, TestCase};
//!
//! let case = TestCase::setup("test_person_page").unwrap();
//! let page = Response::ok("<html><h1>Hermione Granger</h1></html>");
//! let doc = case.check_status_and_parse(&page, 200).unwrap();
//! let title = get_one(&doc, "h1", "page title").unwrap();
//! assert_eq!(title.text(), Some("Hermione Granger"));
//! ```

pub mod case;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod sanitize;
pub mod selector;
pub mod tree;
pub mod validator;

pub use case::TestCase;
pub use config::ValidatorConfig;
pub use error::{CheckError, CheckResult, PlaceholderHit};
pub use render::{Context, Template};
pub use selector::{Selector, SelectorError};
pub use tree::{Document, Element, NodeId, QueryAll};
pub use validator::{assert_none, get_matches, get_one, HttpResponse, Response, ResponseValidator};
