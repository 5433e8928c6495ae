//! Path selectors over [`Document`](crate::tree::Document) trees
//!
//! The dialect is the ElementPath subset of XPath:
//!
//! | syntax            | selects                                                   |
//! |-------------------|-----------------------------------------------------------|
//! | `tag`             | child elements named `tag`                                |
//! | `*`               | all child elements                                        |
//! | `.`               | the current element                                       |
//! | `..`              | the parent (never above the query origin)                 |
//! | `a//b`            | every `b` below each `a`                                  |
//! | `[@attr]`         | elements carrying `attr`                                  |
//! | `[@attr='v']`     | elements whose `attr` equals `v` (`!=` negates)           |
//! | `[tag]`           | elements with a child `tag`                               |
//! | `[tag='text']`    | elements with a child `tag` whose full text is `text`     |
//! | `[.='text']`      | elements whose full text is `text`                        |
//! | `[n]`, `[last()]` | position among siblings with the same tag (1-based)       |
//!
//! Selectors are relative: a leading `/` is rejected.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::tree::Element;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

/// A compiled path selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Current,
    Parent,
    Any,
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttr(String),
    Attr { name: String, value: String, negate: bool },
    HasChild(String),
    ChildText { tag: String, value: String, negate: bool },
    FullText { value: String, negate: bool },
    /// Zero-based index among same-tag siblings
    Index(usize),
    /// Offset back from the last same-tag sibling
    FromLast(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let steps = Parser::new(source).parse_path()?;
        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate against `origin`, returning matches in discovery order.
    pub fn select<'a>(&self, origin: Element<'a>) -> Vec<Element<'a>> {
        let mut current = vec![origin];

        for step in &self.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();

            for node in &current {
                for candidate in step.candidates(*node, origin) {
                    if seen.insert(candidate.id()) {
                        next.push(candidate);
                    }
                }
            }

            for predicate in &step.predicates {
                next.retain(|e| predicate.matches(*e, origin));
            }
            current = next;
        }

        current
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Step {
    fn candidates<'a>(&self, node: Element<'a>, origin: Element<'a>) -> Vec<Element<'a>> {
        let parent_of = |e: Element<'a>| if e == origin { None } else { e.parent() };

        match (self.axis, &self.test) {
            (Axis::Child, NodeTest::Current) => vec![node],
            (Axis::Child, NodeTest::Parent) => parent_of(node).into_iter().collect(),
            (Axis::Child, test) => node.children().filter(|e| test.accepts(*e)).collect(),
            (Axis::Descendant, NodeTest::Current) => {
                std::iter::once(node).chain(node.descendants()).collect()
            }
            (Axis::Descendant, NodeTest::Parent) => {
                node.descendants().filter_map(parent_of).collect()
            }
            (Axis::Descendant, test) => node.descendants().filter(|e| test.accepts(*e)).collect(),
        }
    }
}

impl NodeTest {
    fn accepts(&self, element: Element<'_>) -> bool {
        match self {
            NodeTest::Any => true,
            NodeTest::Tag(tag) => element.tag() == tag.as_str(),
            NodeTest::Current | NodeTest::Parent => false,
        }
    }
}

impl Predicate {
    fn matches(&self, element: Element<'_>, origin: Element<'_>) -> bool {
        match self {
            Predicate::HasAttr(name) => element.attr(name).is_some(),
            Predicate::Attr { name, value, negate } => match element.attr(name) {
                Some(actual) => (actual == value.as_str()) != *negate,
                None => false,
            },
            Predicate::HasChild(tag) => element.children().any(|c| c.tag() == tag.as_str()),
            Predicate::ChildText { tag, value, negate } => element
                .children()
                .filter(|c| c.tag() == tag.as_str())
                .any(|c| (c.text_content() == *value) != *negate),
            Predicate::FullText { value, negate } => (element.text_content() == *value) != *negate,
            Predicate::Index(index) => same_tag_siblings(element, origin)
                .and_then(|siblings| siblings.get(*index).copied())
                .map_or(false, |e| e == element),
            Predicate::FromLast(offset) => same_tag_siblings(element, origin)
                .and_then(|siblings| {
                    let len = siblings.len();
                    (len > *offset).then(|| siblings[len - 1 - offset])
                })
                .map_or(false, |e| e == element),
        }
    }
}

fn same_tag_siblings<'a>(element: Element<'a>, origin: Element<'_>) -> Option<Vec<Element<'a>>> {
    if element.id() == origin.id() {
        return None;
    }
    let parent = element.parent()?;
    Some(parent.children().filter(|c| c.tag() == element.tag()).collect())
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectorError {
        SelectorError {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn parse_path(&mut self) -> Result<Vec<Step>, SelectorError> {
        match self.peek() {
            None => return Err(self.error("empty selector")),
            Some('/') => {
                return Err(self.error("absolute paths are not supported; start with '.' or a tag"))
            }
            _ => {}
        }

        let mut steps = Vec::new();
        let mut axis = Axis::Child;
        loop {
            let test = self.parse_test()?;
            let mut predicates = Vec::new();
            while self.peek() == Some('[') {
                predicates.push(self.parse_predicate()?);
            }
            steps.push(Step { axis, test, predicates });

            match self.peek() {
                None => break,
                Some('/') => {
                    self.pos += 1;
                    axis = if self.peek() == Some('/') {
                        self.pos += 1;
                        Axis::Descendant
                    } else {
                        Axis::Child
                    };
                    if self.peek().is_none() {
                        return Err(self.error("selector ends with '/'"));
                    }
                }
                Some(c) => {
                    return Err(self.error(format!("unexpected {:?} at offset {}", c, self.pos)))
                }
            }
        }

        Ok(steps)
    }

    fn parse_test(&mut self) -> Result<NodeTest, SelectorError> {
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(NodeTest::Any)
            }
            Some('.') => {
                self.pos += 1;
                if self.peek() == Some('.') {
                    self.pos += 1;
                    Ok(NodeTest::Parent)
                } else {
                    Ok(NodeTest::Current)
                }
            }
            Some(c) if is_name_start(c) => {
                let start = self.pos;
                while self.peek().map_or(false, is_name_char) {
                    self.pos += 1;
                }
                Ok(NodeTest::Tag(self.chars[start..self.pos].iter().collect()))
            }
            Some(c) => Err(self.error(format!(
                "expected a tag, '*', '.' or '..' at offset {}, found {:?}",
                self.pos, c
            ))),
            None => Err(self.error("expected a tag, '*', '.' or '..'")),
        }
    }

    fn parse_predicate(&mut self) -> Result<Predicate, SelectorError> {
        self.pos += 1;
        let start = self.pos;
        let mut quote: Option<char> = None;

        loop {
            let c = self
                .peek()
                .ok_or_else(|| self.error("unterminated predicate"))?;
            self.pos += 1;
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '\'' || c == '"' => quote = Some(c),
                None if c == ']' => break,
                None => {}
            }
        }

        let body: String = self.chars[start..self.pos - 1].iter().collect();
        self.predicate_from(body.trim())
    }

    fn predicate_from(&self, body: &str) -> Result<Predicate, SelectorError> {
        if body.is_empty() {
            return Err(self.error("empty predicate"));
        }

        if let Some(rest) = body.strip_prefix('@') {
            let (name, comparison) = self.split_comparison(rest)?;
            self.check_name(&name)?;
            return Ok(match comparison {
                None => Predicate::HasAttr(name),
                Some((value, negate)) => Predicate::Attr { name, value, negate },
            });
        }

        if body.chars().all(|c| c.is_ascii_digit()) {
            let n: usize = body
                .parse()
                .map_err(|_| self.error(format!("position {} is too large", body)))?;
            if n == 0 {
                return Err(self.error("positions start at 1"));
            }
            return Ok(Predicate::Index(n - 1));
        }

        if let Some(rest) = body.strip_prefix("last()") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Ok(Predicate::FromLast(0));
            }
            return match rest.strip_prefix('-').map(|k| k.trim().parse::<usize>()) {
                Some(Ok(k)) => Ok(Predicate::FromLast(k)),
                _ => Err(self.error(format!("bad position expression {:?}", body))),
            };
        }

        let (lhs, comparison) = self.split_comparison(body)?;
        if lhs == "." {
            let (value, negate) =
                comparison.ok_or_else(|| self.error("'[.]' needs a comparison such as [.='text']"))?;
            return Ok(Predicate::FullText { value, negate });
        }

        self.check_name(&lhs)?;
        Ok(match comparison {
            None => Predicate::HasChild(lhs),
            Some((value, negate)) => Predicate::ChildText { tag: lhs, value, negate },
        })
    }

    /// Split `lhs='value'` / `lhs!='value'` / `lhs`.
    fn split_comparison(&self, body: &str) -> Result<(String, Option<(String, bool)>), SelectorError> {
        let Some(eq) = body.find('=') else {
            return Ok((body.trim().to_string(), None));
        };

        let negate = body[..eq].ends_with('!');
        let lhs_end = if negate { eq - 1 } else { eq };
        let lhs = body[..lhs_end].trim().to_string();
        let rhs = body[eq + 1..].trim();

        let mut chars = rhs.chars();
        let value = match (chars.next(), chars.next_back()) {
            (Some(open), Some(close)) if open == close && (open == '\'' || open == '"') => {
                let inner = &rhs[1..rhs.len() - 1];
                if inner.contains(open) {
                    return Err(self.error(format!("unbalanced quotes in {:?}", rhs)));
                }
                inner.to_string()
            }
            _ => return Err(self.error(format!("comparison value {:?} must be quoted", rhs))),
        };

        Ok((lhs, Some((value, negate))))
    }

    fn check_name(&self, name: &str) -> Result<(), SelectorError> {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if is_name_start(c) && chars.all(is_name_char) => Ok(()),
            _ => Err(self.error(format!("{:?} is not a valid name", name))),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Document, QueryAll};
    use test_case::test_case;

    const PAGE: &str = r#"<html>
<head><title>Amy</title></head>
<body>
  <table class="people">
    <tr><th>Name</th><th>Slug</th></tr>
    <tr class="active"><td>Hermione Granger</td><td>granger.h</td></tr>
    <tr class="active"><td>Harry Potter</td><td>potter.h</td></tr>
    <tr class="inactive"><td>Ron Weasley</td><td>weasley.ron</td></tr>
  </table>
  <form action="/login/" method="post">
    <input type="text" name="username"/>
    <input type="password" name="password"/>
    <input type="submit" value="Log in"/>
  </form>
  <p>Alpha</p><div><p>Beta</p></div>
</body>
</html>"#;

    fn texts(doc: &Document, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        doc.query_all(&selector)
            .into_iter()
            .map(|e| e.text_content())
            .collect()
    }

    fn count(doc: &Document, selector: &str) -> usize {
        doc.query_all(&Selector::parse(selector).unwrap()).len()
    }

    #[test_case("head", 1 ; "direct child")]
    #[test_case("title", 0 ; "grandchild is not a child")]
    #[test_case("head/title", 1 ; "child path")]
    #[test_case(".//title", 1 ; "descendant")]
    #[test_case(".//tr", 4 ; "all rows")]
    #[test_case("body/*", 4 ; "any child")]
    #[test_case(".//input", 3 ; "inputs")]
    #[test_case(".", 1 ; "self")]
    #[test_case("..", 0 ; "no parent above origin")]
    #[test_case(".//p", 2 ; "nested and flat paragraphs")]
    #[test_case("body//p", 2 ; "descendant from step")]
    #[test_case(".//td/..", 3 ; "parents of cells")]
    #[test_case(".//table//..", 5 ; "parents inside table")]
    fn test_counts(selector: &str, expected: usize) {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(count(&doc, selector), expected, "selector {}", selector);
    }

    #[test_case(".//tr[@class]", 3 ; "has attribute")]
    #[test_case(".//tr[@class='active']", 2 ; "attribute equals")]
    #[test_case(".//tr[@class=\"inactive\"]", 1 ; "double quoted")]
    #[test_case(".//tr[@class!='active']", 1 ; "attribute differs")]
    #[test_case(".//input[@type='submit'][@value='Log in']", 1 ; "chained predicates")]
    #[test_case(".//tr[th]", 1 ; "has child")]
    #[test_case(".//tr[td='Harry Potter']", 1 ; "child text")]
    #[test_case(".//tr[td!='Harry Potter']", 3 ; "child text differs")]
    #[test_case(".//td[.='potter.h']", 1 ; "full text")]
    #[test_case(".//td[.!='potter.h']", 5 ; "full text differs")]
    #[test_case(".//form[@action='/login/']/input", 3 ; "predicate then step")]
    fn test_predicates(selector: &str, expected: usize) {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(count(&doc, selector), expected, "selector {}", selector);
    }

    #[test]
    fn test_dot_compares_text_of_whole_subtree() {
        let doc = Document::parse("<html><p>Amy <b>admin</b></p><p>Amy admin</p></html>").unwrap();
        assert_eq!(count(&doc, "p[.='Amy admin']"), 2);
        assert_eq!(count(&doc, "p[.='Amy ']"), 0);
        assert_eq!(count(&doc, "p[.!='Amy admin']"), 0);
    }

    #[test]
    fn test_positions_are_per_sibling_group() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(texts(&doc, ".//tr[2]/td[1]"), vec!["Hermione Granger"]);
        assert_eq!(texts(&doc, ".//tr[last()]/td[last()]"), vec!["weasley.ron"]);
        assert_eq!(texts(&doc, ".//tr[last()-1]/td[1]"), vec!["Harry Potter"]);
        // Every <td> that is first among its row's cells
        assert_eq!(
            texts(&doc, ".//td[1]"),
            vec!["Hermione Granger", "Harry Potter", "Ron Weasley"]
        );
        assert_eq!(count(&doc, ".//tr[9]"), 0);
        assert_eq!(count(&doc, ".//tr[last()-9]"), 0);
    }

    #[test]
    fn test_results_in_document_order_without_duplicates() {
        let doc = Document::parse("<html><a><a><b/></a></a></html>").unwrap();
        // Both <a> elements reach the inner <b>; it must appear once.
        assert_eq!(count(&doc, ".//a//b"), 1);
        assert_eq!(count(&doc, ".//a"), 2);
    }

    #[test]
    fn test_query_relative_to_element() {
        let doc = Document::parse(PAGE).unwrap();
        let form = doc
            .query_all(&Selector::parse(".//form").unwrap())
            .pop()
            .unwrap();
        let inputs = form.query_all(&Selector::parse("input[@name]").unwrap());
        assert_eq!(inputs.len(), 2);
        // '..' stops at the element the query started from
        assert!(form.query_all(&Selector::parse("..").unwrap()).is_empty());
        assert!(form.query_all(&Selector::parse("input[1]").unwrap()).len() == 1);
    }

    #[test_case("" ; "empty")]
    #[test_case("/html" ; "absolute")]
    #[test_case("//td" ; "absolute descendant")]
    #[test_case("body/" ; "trailing slash")]
    #[test_case(".//tr[" ; "unterminated predicate")]
    #[test_case(".//tr[]" ; "empty predicate")]
    #[test_case(".//tr[0]" ; "zero position")]
    #[test_case(".//tr[@class=active]" ; "unquoted value")]
    #[test_case(".//tr[@class='active\"]" ; "mismatched quotes")]
    #[test_case(".//tr[last()+1]" ; "bad last expression")]
    #[test_case(".//tr[.]" ; "bare dot predicate")]
    #[test_case(".//tr[@]" ; "missing attribute name")]
    #[test_case("tr td" ; "whitespace between steps")]
    #[test_case(".//#id" ; "css syntax")]
    fn test_rejects_invalid(selector: &str) {
        let err = Selector::parse(selector).unwrap_err();
        assert_eq!(err.selector, selector);
    }

    #[test]
    fn test_display_keeps_source() {
        let selector: Selector = ".//tr[@class='active']".parse().unwrap();
        assert_eq!(selector.to_string(), ".//tr[@class='active']");
        assert_eq!(selector.as_str(), ".//tr[@class='active']");
    }
}
