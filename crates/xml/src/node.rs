//! The in-memory content tree and the DOM-like node carrier.
//!
//! [`Element`] trees represent parsed XML content with prefixes resolved
//! away: element and attribute names are expanded [`QName`]s, and the
//! prefix actually seen in (or chosen for) the serialized form is kept
//! only as a hint. [`XmlNode`] is the transport carrier handed to the
//! marshaller by callers that want a node tree instead of bytes.

use crate::name::QName;

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Expanded attribute name. Unprefixed attributes are in no namespace.
    pub name: QName,
    /// Attribute value, unescaped.
    pub value: String,
}

/// A namespace declaration carried on an element.
///
/// `prefix == None` declares the default namespace (`xmlns="..."`).
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    /// Declared prefix, or `None` for the default namespace.
    pub prefix: Option<String>,
    /// The namespace URI bound to the prefix.
    pub uri: String,
}

/// One XML element with its attributes, namespace declarations and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: QName,
    prefix: Option<String>,
    attributes: Vec<Attribute>,
    namespaces: Vec<NamespaceDecl>,
    children: Vec<XmlNode>,
}

impl Element {
    /// Creates an empty element with the given expanded name.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            prefix: None,
            attributes: Vec::new(),
            namespaces: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The expanded name of this element.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The prefix this element carried in its serialized form, if any.
    ///
    /// This is a hint only: the marshaller may choose a different prefix
    /// when an installed prefix mapper says so or when the hint collides.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Records the serialized-form prefix hint.
    pub fn set_prefix(&mut self, prefix: Option<String>) {
        self.prefix = prefix;
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute value by expanded name.
    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute, replacing any existing attribute of the same name.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attributes.push(Attribute { name, value });
        }
    }

    /// Builder form of [`Element::set_attribute`].
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Namespace declarations carried on this element.
    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    /// Records a namespace declaration on this element.
    pub fn declare_namespace(&mut self, prefix: Option<String>, uri: impl Into<String>) {
        self.namespaces.push(NamespaceDecl {
            prefix,
            uri: uri.into(),
        });
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Appends a child node. Document and fragment nodes cannot nest inside
    /// an element and are ignored; the return value reports acceptance.
    pub fn append_child(&mut self, child: XmlNode) -> bool {
        match child {
            XmlNode::Document(_) | XmlNode::Fragment(_) => false,
            other => {
                self.children.push(other);
                true
            }
        }
    }

    /// Appends a child element.
    pub fn push_element(&mut self, element: Element) {
        self.children.push(XmlNode::Element(element));
    }

    /// Builder form of [`Element::push_element`].
    pub fn with_child(mut self, element: Element) -> Self {
        self.push_element(element);
        self
    }

    /// Appends a text child.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Builder form of [`Element::push_text`].
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// First child element with the given expanded name.
    pub fn child(&self, namespace: Option<&str>, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.name.matches(namespace, local))
    }

    /// Concatenated text content of the direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }
}

/// A node in a DOM-like tree.
///
/// Only the container kinds (document, fragment, element) accept children;
/// the marshaller refuses any other node as a serialization target.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// A document node, the usual target for whole-part serialization.
    Document(Vec<XmlNode>),
    /// A parentless fragment of nodes.
    Fragment(Vec<XmlNode>),
    /// An element node.
    Element(Element),
    /// A text node, unescaped.
    Text(String),
    /// A comment node.
    Comment(String),
}

impl XmlNode {
    /// Creates an empty document node.
    pub fn document() -> Self {
        XmlNode::Document(Vec::new())
    }

    /// Creates an empty fragment node.
    pub fn fragment() -> Self {
        XmlNode::Fragment(Vec::new())
    }

    /// Whether this node kind can hold children.
    pub fn accepts_children(&self) -> bool {
        matches!(
            self,
            XmlNode::Document(_) | XmlNode::Fragment(_) | XmlNode::Element(_)
        )
    }

    /// A short label for the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            XmlNode::Document(_) => "document",
            XmlNode::Fragment(_) => "fragment",
            XmlNode::Element(_) => "element",
            XmlNode::Text(_) => "text",
            XmlNode::Comment(_) => "comment",
        }
    }

    /// Appends a child if this node is a container; reports acceptance.
    pub fn append_child(&mut self, child: XmlNode) -> bool {
        match self {
            XmlNode::Document(children) | XmlNode::Fragment(children) => {
                children.push(child);
                true
            }
            XmlNode::Element(element) => element.append_child(child),
            _ => false,
        }
    }

    /// Child nodes of a container, or an empty slice for leaf nodes.
    pub fn children(&self) -> &[XmlNode] {
        match self {
            XmlNode::Document(children) | XmlNode::Fragment(children) => children,
            XmlNode::Element(element) => element.children(),
            _ => &[],
        }
    }

    /// This node as an element, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// The parsed content of one XML part.
///
/// A codec owns at most one current tree; unmarshalling replaces it
/// wholesale on success and the codec itself never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTree {
    root: Element,
}

impl ContentTree {
    /// Wraps a root element as the content of a part.
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// The root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Mutable access to the root element, for external collaborators
    /// that edit part content between unmarshal and marshal.
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Consumes the tree, returning the root element.
    pub fn into_root(self) -> Element {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_concatenates_direct_text_children() {
        let mut el = Element::new(QName::local("greeting"));
        el.push_text("hel");
        el.push_text("lo");
        assert_eq!(el.text(), "hello");
    }

    #[test]
    fn test_leaf_nodes_reject_children() {
        let mut text = XmlNode::Text("x".to_string());
        assert!(!text.accepts_children());
        assert!(!text.append_child(XmlNode::Comment("y".to_string())));
    }

    #[test]
    fn test_document_and_fragment_nodes_do_not_nest_in_elements() {
        let mut el = Element::new(QName::local("root"));
        assert!(!el.append_child(XmlNode::document()));
        assert!(el.append_child(XmlNode::Text("ok".to_string())));
    }

    #[test]
    fn test_attribute_lookup_by_expanded_name() {
        let el = Element::new(QName::local("rel"))
            .with_attribute(QName::local("Id"), "rId1")
            .with_attribute(QName::new("urn:test", "Id"), "other");
        assert_eq!(el.attribute(None, "Id"), Some("rId1"));
        assert_eq!(el.attribute(Some("urn:test"), "Id"), Some("other"));
        assert_eq!(el.attribute(None, "Missing"), None);
    }
}
