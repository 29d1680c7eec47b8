//! # Carton XML binding layer
//!
//! This crate is the XML side of Carton: the content tree model for one
//! packaged part, the binding engine seam, and the default quick-xml
//! engine implementation.
//!
//! ## Architecture
//!
//! - **Content tree** ([`node`]): element trees with prefixes resolved to
//!   expanded names. [`ContentTree`] is the unit a part codec owns.
//! - **Schema sets** ([`schema`]): the declarative shape a
//!   [`BindingContext`] binds against, expressible in JSON.
//! - **Engine seam** ([`engine`]): factories for per-call marshaller and
//!   unmarshaller resources, plus the named-property capability call
//!   engines differ on. Probing an unknown property yields a recoverable
//!   [`PropertyError::Unsupported`], never a crash.
//! - **Validation events** ([`event`]): findings made while binding
//!   input, run past a per-call policy that decides continue-or-abort.
//! - **Default engine** ([`quick`]): streaming quick-xml implementation
//!   with deterministic prefix assignment.
//!
//! ## Example
//!
//! ```ignore
//! use carton_xml::{BindingContext, SchemaSet};
//!
//! let context = BindingContext::new(SchemaSet::relationships());
//! let mut unmarshaller = context.create_unmarshaller()?;
//! let tree = unmarshaller.unmarshal(&mut input)?;
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod name;
pub mod node;
pub mod ns;
pub mod quick;
pub mod schema;

pub use context::BindingContext;
pub use engine::{
    BindingEngine, LegacyPrefixMapper, Marshaller, PrefixMapper, PropertyValue, Unmarshaller,
    property,
};
pub use error::{EngineError, PropertyError};
pub use event::{EventRecorder, LenientHandler, Severity, ValidationEvent, ValidationEventHandler};
pub use name::QName;
pub use node::{Attribute, ContentTree, Element, NamespaceDecl, XmlNode};
pub use quick::QuickXmlEngine;
pub use schema::{AttributeDecl, ContentModel, ElementDecl, SchemaSet};
