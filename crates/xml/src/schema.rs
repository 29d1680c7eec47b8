//! Declarative element schemas backing a binding context.
//!
//! A [`SchemaSet`] is the mapping from element names to the shape the
//! engine binds against: which attributes an element carries and what
//! kind of content it holds. Sets are plain data and can be declared in
//! JSON, so callers can ship binding contexts alongside their parts.

use serde::{Deserialize, Serialize};

use crate::name::QName;
use crate::ns;

/// How an element's content is shaped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentModel {
    /// No children at all.
    Empty,
    /// Text content only.
    Text,
    /// Child elements drawn from the listed names.
    Elements(Vec<QName>),
    /// Anything goes; no content checks are made.
    #[default]
    Any,
}

/// One attribute an element is declared to carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDecl {
    /// Expanded attribute name.
    pub name: QName,
    /// Whether unmarshalling records an event when the attribute is absent.
    #[serde(default)]
    pub required: bool,
}

impl AttributeDecl {
    /// Declares an optional attribute.
    pub fn optional(name: QName) -> Self {
        Self {
            name,
            required: false,
        }
    }

    /// Declares a required attribute.
    pub fn required(name: QName) -> Self {
        Self {
            name,
            required: true,
        }
    }
}

/// The declared shape of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDecl {
    /// Expanded element name.
    pub name: QName,
    /// Declared attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
    /// Content model.
    #[serde(default)]
    pub content: ContentModel,
}

impl ElementDecl {
    /// Declares an element with no attributes and an open content model.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            content: ContentModel::Any,
        }
    }

    /// Sets the content model.
    pub fn with_content(mut self, content: ContentModel) -> Self {
        self.content = content;
        self
    }

    /// Adds an attribute declaration.
    pub fn with_attribute(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// A set of element declarations the engine binds against.
///
/// Root elements of unmarshalled input must be declared here; nested
/// declared elements are checked recursively, undeclared nested elements
/// pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSet {
    elements: Vec<ElementDecl>,
}

impl SchemaSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element declaration.
    pub fn with_element(mut self, decl: ElementDecl) -> Self {
        self.elements.push(decl);
        self
    }

    /// Looks up the declaration for an element name.
    pub fn element(&self, name: &QName) -> Option<&ElementDecl> {
        self.elements.iter().find(|decl| &decl.name == name)
    }

    /// Number of declared elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the set declares nothing.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Loads a set from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the set to JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The built-in schema of a package relationships part.
    pub fn relationships() -> Self {
        let relationship = QName::new(ns::RELATIONSHIPS, "Relationship");
        SchemaSet::new()
            .with_element(
                ElementDecl::new(QName::new(ns::RELATIONSHIPS, "Relationships"))
                    .with_content(ContentModel::Elements(vec![relationship.clone()])),
            )
            .with_element(
                ElementDecl::new(relationship)
                    .with_content(ContentModel::Empty)
                    .with_attribute(AttributeDecl::required(QName::local("Id")))
                    .with_attribute(AttributeDecl::required(QName::local("Type")))
                    .with_attribute(AttributeDecl::required(QName::local("Target")))
                    .with_attribute(AttributeDecl::optional(QName::local("TargetMode"))),
            )
    }
}
