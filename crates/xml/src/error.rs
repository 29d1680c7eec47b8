//! Engine-level error types.

use thiserror::Error;

use crate::event::ValidationEvent;
use crate::name::QName;

/// Faults raised by a binding engine while marshalling or unmarshalling.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The input is not well-formed XML.
    #[error("malformed XML input")]
    Parse(#[from] quick_xml::Error),

    /// Escaped or encoded content could not be decoded.
    #[error("undecodable XML content: {0}")]
    Content(String),

    /// Reading or writing the underlying stream failed.
    #[error("I/O failure during XML processing")]
    Io(#[from] std::io::Error),

    /// The root element has no declaration in the binding context.
    #[error("no binding for root element {name}")]
    UnboundRoot {
        /// The undeclared root element name.
        name: QName,
    },

    /// The installed validation policy aborted the unmarshal.
    #[error("aborted on validation event: {event}")]
    Aborted {
        /// The event the policy refused to continue past.
        event: ValidationEvent,
    },

    /// The content tree cannot be serialized as handed over.
    #[error("content tree rejected: {reason}")]
    Tree {
        /// What the engine objected to.
        reason: String,
    },
}

/// Outcome of setting a named property on a marshaller.
#[derive(Error, Debug)]
pub enum PropertyError {
    /// The engine does not recognize the property name.
    ///
    /// This is the recoverable capability signal: callers negotiate an
    /// alternative spelling or proceed without the feature.
    #[error("unsupported engine property {name:?}")]
    Unsupported {
        /// The rejected property name.
        name: String,
    },

    /// The engine knows the property but rejects the supplied value.
    #[error("invalid value for engine property {name:?}: {reason}")]
    Invalid {
        /// The property name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl PropertyError {
    /// Whether this is the recoverable unknown-property signal.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, PropertyError::Unsupported { .. })
    }
}
