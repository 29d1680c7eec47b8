//! # Carton part codec
//!
//! This crate binds one packaged XML part to an in-memory content tree
//! and back, tolerating differences in the active binding engine's
//! feature surface.
//!
//! ## Architecture
//!
//! - [`XmlPartCodec`] owns a part's current [`ContentTree`] and a shared
//!   [`BindingContext`] reference, and exposes the four codec operations:
//!   marshal to node, marshal to stream, unmarshal from stream, unmarshal
//!   from element. Unmarshalling is atomic: the previous tree survives
//!   any failure.
//! - [`PrefixMapperNegotiator`] probes which prefix-mapper property
//!   spelling the engine accepts, falling back from the standards-track
//!   name to the vendor-internal one (adapting the strategy into the
//!   legacy wrapper that spelling requires) and finally to engine-default
//!   prefixes. Capability rejections never abort a marshal.
//! - [`PrefixMappingStrategy`] is the caller's per-call prefix policy:
//!   unset, generic, or relationship-aware.
//!
//! ## Example
//!
//! ```ignore
//! use carton_part::{PartName, XmlPartCodec};
//!
//! let mut codec = XmlPartCodec::with_shared_context(
//!     PartName::new("/_rels/.rels")?,
//! );
//! codec.unmarshal_from_stream(&mut input)?;
//! codec.marshal_to_stream(&mut output)?;
//! ```
//!
//! [`ContentTree`]: carton_xml::ContentTree
//! [`BindingContext`]: carton_xml::BindingContext

pub mod codec;
pub mod error;
pub mod name;
pub mod negotiate;
pub mod prefix;

pub use codec::XmlPartCodec;
pub use error::{ConfigurationError, DeserializationError, PartError, SerializationError};
pub use name::{ContentType, PartName};
pub use negotiate::{MapperOutcome, PrefixMapperNegotiator, PrefixNegotiation, PropertyAttempt};
pub use prefix::{
    DefaultPrefixMapper, LegacyMapperAdapter, LegacyRelationshipAdapter, PrefixMappingStrategy,
    RelationshipPrefixMapper,
};
