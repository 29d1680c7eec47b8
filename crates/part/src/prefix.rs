//! Prefix-mapping strategies and their legacy adapters.
//!
//! A strategy is the caller's policy for one marshal call. The closed
//! variant set lets the negotiator switch on the kind explicitly when it
//! adapts the mapper for the vendor-internal property spelling.

use std::fmt;
use std::sync::Arc;

use carton_xml::{LegacyPrefixMapper, PrefixMapper, ns};

/// Neutral mapper: well-known package namespaces get their conventional
/// prefixes, anything else keeps the prefix the input used, if any.
#[derive(Debug, Default, Clone)]
pub struct DefaultPrefixMapper;

impl DefaultPrefixMapper {
    /// Creates the mapper.
    pub fn new() -> Self {
        Self
    }
}

impl PrefixMapper for DefaultPrefixMapper {
    fn preferred_prefix(
        &self,
        namespace_uri: &str,
        suggestion: Option<&str>,
        _require_prefix: bool,
    ) -> Option<String> {
        let known = match namespace_uri {
            ns::RELATIONSHIPS => Some("r"),
            ns::CONTENT_TYPES => Some("ct"),
            ns::CORE_PROPERTIES => Some("cp"),
            ns::DUBLIN_CORE => Some("dc"),
            ns::MARKUP_COMPATIBILITY => Some("mc"),
            _ => None,
        };
        match known {
            Some(prefix) => Some(prefix.to_string()),
            None => suggestion.map(str::to_owned),
        }
    }
}

/// Relationship-aware mapper: the relationships namespace serializes as
/// the default namespace, so a relationships part gets an unprefixed
/// root. Everything else defers to the inner mapper.
pub struct RelationshipPrefixMapper {
    inner: Arc<dyn PrefixMapper>,
}

impl RelationshipPrefixMapper {
    /// Creates the mapper over the neutral default.
    pub fn new() -> Self {
        Self::with_inner(Arc::new(DefaultPrefixMapper::new()))
    }

    /// Creates the mapper over an explicit inner mapper.
    pub fn with_inner(inner: Arc<dyn PrefixMapper>) -> Self {
        Self { inner }
    }
}

impl Default for RelationshipPrefixMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixMapper for RelationshipPrefixMapper {
    fn preferred_prefix(
        &self,
        namespace_uri: &str,
        suggestion: Option<&str>,
        require_prefix: bool,
    ) -> Option<String> {
        if namespace_uri == ns::RELATIONSHIPS && !require_prefix {
            return Some(String::new());
        }
        self.inner
            .preferred_prefix(namespace_uri, suggestion, require_prefix)
    }
}

/// How a caller wants namespace prefixes chosen for one marshal call.
///
/// Passed per call and never retained by the codec.
#[derive(Clone)]
pub enum PrefixMappingStrategy {
    /// No preference: the negotiator installs the neutral default mapper.
    EngineDefault,
    /// A caller-supplied mapper.
    Generic(Arc<dyn PrefixMapper>),
    /// A caller-supplied mapper for relationship parts. The fallback
    /// adapter keeps the relationships namespace on the default prefix.
    RelationshipAware(Arc<dyn PrefixMapper>),
}

impl PrefixMappingStrategy {
    /// A short label for the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PrefixMappingStrategy::EngineDefault => "engine-default",
            PrefixMappingStrategy::Generic(_) => "generic",
            PrefixMappingStrategy::RelationshipAware(_) => "relationship-aware",
        }
    }
}

impl fmt::Debug for PrefixMappingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Adapts a mapper to the older callback shape the vendor-internal
/// property spelling requires.
pub struct LegacyMapperAdapter {
    inner: Arc<dyn PrefixMapper>,
}

impl LegacyMapperAdapter {
    /// Wraps a mapper.
    pub fn new(inner: Arc<dyn PrefixMapper>) -> Self {
        Self { inner }
    }
}

impl LegacyPrefixMapper for LegacyMapperAdapter {
    fn namespace_prefix(
        &self,
        namespace_uri: &str,
        suggestion: &str,
        require_prefix: bool,
    ) -> String {
        let suggestion = (!suggestion.is_empty()).then_some(suggestion);
        self.inner
            .preferred_prefix(namespace_uri, suggestion, require_prefix)
            .unwrap_or_default()
    }
}

/// Relationship-aware counterpart of [`LegacyMapperAdapter`].
pub struct LegacyRelationshipAdapter {
    inner: Arc<dyn PrefixMapper>,
}

impl LegacyRelationshipAdapter {
    /// Wraps a mapper.
    pub fn new(inner: Arc<dyn PrefixMapper>) -> Self {
        Self { inner }
    }
}

impl LegacyPrefixMapper for LegacyRelationshipAdapter {
    fn namespace_prefix(
        &self,
        namespace_uri: &str,
        suggestion: &str,
        require_prefix: bool,
    ) -> String {
        if namespace_uri == ns::RELATIONSHIPS && !require_prefix {
            return String::new();
        }
        let suggestion = (!suggestion.is_empty()).then_some(suggestion);
        self.inner
            .preferred_prefix(namespace_uri, suggestion, require_prefix)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapper_knows_package_namespaces() {
        let mapper = DefaultPrefixMapper::new();
        assert_eq!(
            mapper.preferred_prefix(ns::RELATIONSHIPS, None, false),
            Some("r".to_string())
        );
        assert_eq!(
            mapper.preferred_prefix("urn:unknown", Some("u"), false),
            Some("u".to_string())
        );
        assert_eq!(mapper.preferred_prefix("urn:unknown", None, false), None);
    }

    #[test]
    fn test_relationship_mapper_forces_default_prefix() {
        let mapper = RelationshipPrefixMapper::new();
        assert_eq!(
            mapper.preferred_prefix(ns::RELATIONSHIPS, None, false),
            Some(String::new())
        );
        // Attributes cannot live in the default namespace.
        assert_eq!(
            mapper.preferred_prefix(ns::RELATIONSHIPS, None, true),
            Some("r".to_string())
        );
    }

    #[test]
    fn test_legacy_adapter_translates_the_callback_shape() {
        let adapter = LegacyMapperAdapter::new(Arc::new(DefaultPrefixMapper::new()));
        assert_eq!(adapter.namespace_prefix(ns::CORE_PROPERTIES, "", false), "cp");
        assert_eq!(adapter.namespace_prefix("urn:unknown", "u", false), "u");
        assert_eq!(adapter.namespace_prefix("urn:unknown", "", false), "");
    }

    #[test]
    fn test_legacy_relationship_adapter_keeps_default_namespace() {
        let adapter = LegacyRelationshipAdapter::new(Arc::new(DefaultPrefixMapper::new()));
        assert_eq!(adapter.namespace_prefix(ns::RELATIONSHIPS, "", false), "");
        assert_eq!(adapter.namespace_prefix(ns::RELATIONSHIPS, "", true), "r");
    }
}
