//! Owned element tree for parsed pages

use std::fmt;

use crate::selector::Selector;

/// Index of an element inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    tail: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed page. The root element always has id 0.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Parse well-formed XML. Comments and processing instructions are dropped.
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let parsed = roxmltree::Document::parse(xml)?;
        let mut nodes = Vec::new();
        build(parsed.root_element(), None, &mut nodes);
        Ok(Self { nodes })
    }

    pub fn root(&self) -> Element<'_> {
        Element {
            doc: self,
            id: NodeId(0),
        }
    }

    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        (id.0 < self.nodes.len()).then_some(Element { doc: self, id })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

fn build(node: roxmltree::Node<'_, '_>, parent: Option<NodeId>, nodes: &mut Vec<NodeData>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(NodeData {
        tag: node.tag_name().name().to_string(),
        attrs: node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect(),
        text: None,
        tail: None,
        parent,
        children: Vec::new(),
    });

    for child in node.children() {
        if child.is_element() {
            let child_id = build(child, Some(id), nodes);
            nodes[id.0].children.push(child_id);
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            let last = nodes[id.0].children.last().copied();
            let slot = match last {
                Some(last) => &mut nodes[last.0].tail,
                None => &mut nodes[id.0].text,
            };
            slot.get_or_insert_with(String::new).push_str(text);
        }
    }

    id
}

/// Borrowed handle to one element of a [`Document`]
#[derive(Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Element<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Local tag name, without namespace
    pub fn tag(&self) -> &'a str {
        &self.doc.data(self.id).tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.doc
            .data(self.id)
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order
    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.doc
            .data(self.id)
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text before the first child element
    pub fn text(&self) -> Option<&'a str> {
        self.doc.data(self.id).text.as_deref()
    }

    /// Text after this element's end tag, up to the next sibling
    pub fn tail(&self) -> Option<&'a str> {
        self.doc.data(self.id).tail.as_deref()
    }

    /// All text inside this element, in document order
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = self.text() {
            out.push_str(text);
        }
        for child in self.children() {
            child.collect_text(out);
            if let Some(tail) = child.tail() {
                out.push_str(tail);
            }
        }
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.doc.data(self.id).parent.map(|id| Element { doc: self.doc, id })
    }

    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let doc = self.doc;
        doc.data(self.id)
            .children
            .iter()
            .map(move |&id| Element { doc, id })
    }

    /// Every element below this one, in document order
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack: Vec<NodeId> = self.doc.data(self.id).children.clone();
        stack.reverse();
        Descendants { doc: self.doc, stack }
    }

    /// Whether `self` is `other` or lies below it
    pub fn is_within(&self, other: Element<'_>) -> bool {
        let mut cursor = Some(*self);
        while let Some(node) = cursor {
            if node.id == other.id {
                return true;
            }
            cursor = node.parent();
        }
        false
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag())
            .field("id", &self.id.0)
            .finish()
    }
}

/// Pre-order walk below an element
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.data(id).children.iter().rev().copied());
        Some(Element { doc: self.doc, id })
    }
}

/// Anything that can answer selector queries.
pub trait QueryAll {
    fn query_all(&self, selector: &Selector) -> Vec<Element<'_>>;
}

impl QueryAll for Document {
    /// Queries run relative to the root element.
    fn query_all(&self, selector: &Selector) -> Vec<Element<'_>> {
        selector.select(self.root())
    }
}

impl<'a> QueryAll for Element<'a> {
    fn query_all(&self, selector: &Selector) -> Vec<Element<'_>> {
        selector.select(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<h1>Title <em>here</em> now</h1>
<!-- comment -->
<table id="people"><tr><td>Hermione</td></tr><tr><td>Harry</td></tr></table>
</body></html>"#;

    #[test]
    fn test_text_and_tail() {
        let doc = Document::parse(PAGE).unwrap();
        let body = doc.root().children().next().unwrap();
        let h1 = body.children().next().unwrap();
        let em = h1.children().next().unwrap();

        assert_eq!(h1.tag(), "h1");
        assert_eq!(h1.text(), Some("Title "));
        assert_eq!(em.text(), Some("here"));
        assert_eq!(em.tail(), Some(" now"));
        assert_eq!(h1.text_content(), "Title here now");
    }

    #[test]
    fn test_comment_text_joins_tail() {
        let doc = Document::parse(PAGE).unwrap();
        let body = doc.root().children().next().unwrap();
        let h1 = body.children().next().unwrap();
        assert_eq!(h1.tail(), Some("\n\n"));
        assert_eq!(body.children().count(), 2);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = Document::parse(PAGE).unwrap();
        let tags: Vec<&str> = doc.root().descendants().map(|e| e.tag()).collect();
        assert_eq!(tags, vec!["body", "h1", "em", "table", "tr", "td", "tr", "td"]);
        assert_eq!(doc.len(), 9);
    }

    #[test]
    fn test_attributes_and_parents() {
        let doc = Document::parse(r#"<html><a href="/x" class="btn">go</a></html>"#).unwrap();
        let a = doc.root().children().next().unwrap();

        assert_eq!(a.attr("href"), Some("/x"));
        assert_eq!(a.attr("missing"), None);
        assert_eq!(a.attrs().collect::<Vec<_>>(), vec![("href", "/x"), ("class", "btn")]);
        assert_eq!(a.parent(), Some(doc.root()));
        assert!(a.is_within(doc.root()));
        assert!(!doc.root().is_within(a));
        assert_eq!(doc.element(a.id()), Some(a));
    }

    #[test]
    fn test_entities_are_resolved() {
        let doc = Document::parse("<html><p>a &amp; b &#169;</p></html>").unwrap();
        let p = doc.root().children().next().unwrap();
        assert_eq!(p.text(), Some("a & b \u{a9}"));
    }

    #[test]
    fn test_malformed_markup_is_rejected() {
        assert!(Document::parse("<html><p></html>").is_err());
        assert!(Document::parse("<html>&nbsp;</html>").is_err());
    }
}
