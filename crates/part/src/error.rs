//! Error taxonomy for part codec operations.
//!
//! Capability rejections never show up here: an engine refusing a
//! prefix-mapper property name is absorbed by the negotiator's fallback
//! chain. Everything else is wrapped with the part identity attached so
//! the owning container can log or abort.

use thiserror::Error;

use carton_xml::{EngineError, PropertyError};

use crate::name::PartName;

/// Configuration faults. Fatal, surfaced immediately, never retried.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The codec has no binding context installed at call time.
    #[error("part {part}: no binding context installed")]
    UnboundContext {
        /// The part whose codec is unbound.
        part: PartName,
    },

    /// The part name does not follow the package naming rules.
    #[error("invalid part name {name:?}: {reason}")]
    InvalidPartName {
        /// The rejected name.
        name: String,
        /// Which rule it broke.
        reason: String,
    },
}

/// Marshal-side failures. The current content tree is never modified.
#[derive(Error, Debug)]
pub enum SerializationError {
    /// Marshal was called before any content tree was set.
    #[error("part {part}: no content tree to marshal")]
    NoContentTree {
        /// The part being marshalled.
        part: PartName,
    },

    /// The target node kind cannot hold children.
    #[error("part {part}: target {kind} node cannot hold children")]
    TargetNotContainer {
        /// The part being marshalled.
        part: PartName,
        /// The offending node kind.
        kind: &'static str,
    },

    /// The marshaller rejected a property value outright (not the
    /// recoverable unknown-property signal).
    #[error("part {part}: marshaller rejected its configuration")]
    Property {
        /// The part being marshalled.
        part: PartName,
        /// The engine's diagnostic.
        #[source]
        source: PropertyError,
    },

    /// The engine rejected the content tree.
    #[error("part {part}: engine rejected the content tree")]
    Engine {
        /// The part being marshalled.
        part: PartName,
        /// The engine's diagnostic.
        #[source]
        source: EngineError,
    },

    /// Writing the serialized bytes to the caller's stream failed.
    #[error("part {part}: failed writing serialized content")]
    Io {
        /// The part being marshalled.
        part: PartName,
        /// The stream's diagnostic.
        #[source]
        source: std::io::Error,
    },
}

/// Unmarshal-side failures. Unmarshalling is atomic: on any of these the
/// previous content tree, if one was set, stays current.
#[derive(Error, Debug)]
pub enum DeserializationError {
    /// The input is not well-formed XML.
    #[error("part {part}: malformed XML input")]
    Malformed {
        /// The part being unmarshalled.
        part: PartName,
        /// The engine's diagnostic.
        #[source]
        source: EngineError,
    },

    /// The input parsed but does not match the binding context.
    #[error("part {part}: input does not match the binding context")]
    Binding {
        /// The part being unmarshalled.
        part: PartName,
        /// The engine's diagnostic.
        #[source]
        source: EngineError,
    },

    /// The validation policy refused to continue past a fatal event.
    #[error("part {part}: unmarshalling aborted on a fatal validation event")]
    Fatal {
        /// The part being unmarshalled.
        part: PartName,
        /// The engine's diagnostic, carrying the event.
        #[source]
        source: EngineError,
    },
}

impl DeserializationError {
    /// Sorts an engine fault into the unmarshal taxonomy.
    pub(crate) fn from_engine(part: PartName, source: EngineError) -> Self {
        match source {
            EngineError::UnboundRoot { .. } => DeserializationError::Binding { part, source },
            EngineError::Aborted { .. } => DeserializationError::Fatal { part, source },
            _ => DeserializationError::Malformed { part, source },
        }
    }
}

/// Umbrella error for every part codec operation.
#[derive(Error, Debug)]
pub enum PartError {
    /// See [`ConfigurationError`].
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// See [`SerializationError`].
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// See [`DeserializationError`].
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),
}
