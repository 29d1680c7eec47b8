//! Part identity.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// The canonical name of one part inside a package.
///
/// Beyond identifying the part in diagnostics, the name is validated on
/// construction: absolute, no empty segments, no dot segments, no
/// trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartName(String);

impl PartName {
    /// Validates and wraps a part name.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if let Some(reason) = Self::problem(&name) {
            return Err(ConfigurationError::InvalidPartName {
                name,
                reason: reason.to_string(),
            });
        }
        Ok(Self(name))
    }

    fn problem(name: &str) -> Option<&'static str> {
        let rest = match name.strip_prefix('/') {
            Some(rest) => rest,
            None => return Some("must start with '/'"),
        };
        if rest.is_empty() || name.ends_with('/') {
            return Some("must not end with '/'");
        }
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Some("must not contain empty segments");
            }
            if segment == "." || segment == ".." {
                return Some("must not contain dot segments");
            }
        }
        None
    }

    /// The canonical name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PartName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A content-type association, carried for the owning container's benefit
/// and never interpreted by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType(String);

impl ContentType {
    /// Wraps a content-type string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The content type as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_canonical_names() {
        assert!(PartName::new("/word/document.xml").is_ok());
        assert!(PartName::new("/_rels/.rels").is_ok());
    }

    #[test]
    fn test_rejects_relative_and_malformed_names() {
        for bad in ["word/document.xml", "/word/", "/word//document.xml", "/", "/a/../b"] {
            let err = PartName::new(bad).unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidPartName { .. }), "{bad}");
        }
    }

    #[test]
    fn test_parses_from_str() {
        let name: PartName = "/word/document.xml".parse().expect("valid");
        assert_eq!(name.as_str(), "/word/document.xml");
    }
}
