//! Expanded XML names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An expanded XML name: an optional namespace URI plus a local name.
///
/// Prefixes are a serialization concern and are never part of the name
/// itself. The marshaller assigns them when a tree is written out; the
/// unmarshaller resolves them away when input is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, or `None` for names in no namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Creates a name in the given namespace.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Creates a name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Returns true if this name has the given namespace URI and local part.
    pub fn matches(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

impl fmt::Display for QName {
    /// Clark notation: `{namespace-uri}local`, or just `local` when the name
    /// is in no namespace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}
