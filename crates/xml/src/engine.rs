//! The binding engine seam.
//!
//! A [`BindingEngine`] turns a schema set into per-call marshaller and
//! unmarshaller resources. Engines differ in which optional features they
//! expose; features are probed through [`Marshaller::set_property`], whose
//! [`PropertyError::Unsupported`] outcome is a capability signal rather
//! than a hard fault.
//!
//! [`PropertyError::Unsupported`]: crate::error::PropertyError::Unsupported

use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::error::{EngineError, PropertyError};
use crate::event::ValidationEventHandler;
use crate::node::{ContentTree, Element, XmlNode};
use crate::schema::SchemaSet;

/// Well-known engine property names.
pub mod property {
    /// Standards-track spelling of the prefix-mapper hook. Takes a
    /// [`PropertyValue::PrefixMapper`](super::PropertyValue::PrefixMapper).
    pub const PREFIX_MAPPER: &str = "carton.xml.prefix-mapper";

    /// Vendor-internal fallback spelling of the prefix-mapper hook, used
    /// by older engines. Takes a
    /// [`PropertyValue::LegacyPrefixMapper`](super::PropertyValue::LegacyPrefixMapper).
    pub const PREFIX_MAPPER_INTERNAL: &str = "carton.xml.internal.prefix-mapper";

    /// Switches the marshaller to indented output. Takes a
    /// [`PropertyValue::Indent`](super::PropertyValue::Indent).
    pub const INDENT_OUTPUT: &str = "carton.xml.indent-output";
}

/// Policy choosing the serialized prefix for a namespace URI.
pub trait PrefixMapper: Send + Sync {
    /// Returns the preferred prefix for `namespace_uri`.
    ///
    /// `suggestion` is the prefix seen on the input the tree came from, if
    /// any. `require_prefix` is true where the empty (default-namespace)
    /// prefix is not usable, e.g. for namespaced attributes. Returning
    /// `Some("")` requests the default namespace; returning `None` lets the
    /// engine pick.
    fn preferred_prefix(
        &self,
        namespace_uri: &str,
        suggestion: Option<&str>,
        require_prefix: bool,
    ) -> Option<String>;
}

/// The older mapper callback shape the vendor-internal property spelling
/// requires.
pub trait LegacyPrefixMapper: Send + Sync {
    /// Returns the prefix to use for `namespace_uri`; the empty string
    /// requests the default namespace.
    fn namespace_prefix(
        &self,
        namespace_uri: &str,
        suggestion: &str,
        require_prefix: bool,
    ) -> String;
}

/// A value passed to [`Marshaller::set_property`].
#[derive(Clone)]
pub enum PropertyValue {
    /// A standards-track prefix mapper.
    PrefixMapper(Arc<dyn PrefixMapper>),
    /// A mapper wrapped for the vendor-internal spelling.
    LegacyPrefixMapper(Arc<dyn LegacyPrefixMapper>),
    /// A boolean switch.
    Indent(bool),
}

impl PropertyValue {
    /// A short label for the payload kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::PrefixMapper(_) => "prefix mapper",
            PropertyValue::LegacyPrefixMapper(_) => "legacy prefix mapper",
            PropertyValue::Indent(_) => "boolean switch",
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// A per-call serialization resource.
///
/// Created fresh for each marshal call and dropped when the call returns;
/// engines never share marshaller state between calls.
pub trait Marshaller {
    /// Sets a named property, probing the engine's capability surface.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;

    /// Serializes the tree to a byte stream.
    fn marshal(&mut self, tree: &ContentTree, out: &mut dyn Write) -> Result<(), EngineError>;

    /// Serializes the tree as children appended to a container node.
    fn marshal_to_node(
        &mut self,
        tree: &ContentTree,
        target: &mut XmlNode,
    ) -> Result<(), EngineError>;
}

/// A per-call deserialization resource.
pub trait Unmarshaller {
    /// Installs the validation policy for this call.
    fn set_event_handler(&mut self, handler: Box<dyn ValidationEventHandler>);

    /// Parses and binds a byte stream into a new content tree.
    fn unmarshal(&mut self, input: &mut dyn BufRead) -> Result<ContentTree, EngineError>;

    /// Binds an already-parsed element into a new content tree.
    fn unmarshal_element(&mut self, element: &Element) -> Result<ContentTree, EngineError>;
}

/// Factory for scoped marshaller/unmarshaller resources.
pub trait BindingEngine: Send + Sync {
    /// Creates a marshaller bound to the given schema set.
    fn create_marshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Marshaller>, EngineError>;

    /// Creates an unmarshaller bound to the given schema set.
    fn create_unmarshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Unmarshaller>, EngineError>;
}
