//! Capability negotiation for the prefix-mapper hook.
//!
//! Engines expose the prefix-mapper hook under the standards-track
//! property name, under a vendor-internal name with an older callback
//! shape, or not at all. The negotiator probes the spellings in priority
//! order and treats rejection of a name as a capability signal, not a
//! fault: exhausting the chain leaves the engine's default prefixes in
//! force and the marshal call proceeds.

use std::sync::Arc;

use carton_xml::{Marshaller, PrefixMapper, PropertyError, PropertyValue, property};

use crate::name::PartName;
use crate::prefix::{
    DefaultPrefixMapper, LegacyMapperAdapter, LegacyRelationshipAdapter, PrefixMappingStrategy,
};

/// One probe of a property name and what the engine said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAttempt {
    /// The property name probed.
    pub property: &'static str,
    /// Whether the engine accepted it.
    pub accepted: bool,
}

/// Where prefix mapping ended up after negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperOutcome {
    /// A mapper was installed under the named property.
    Installed(&'static str),
    /// Every spelling was rejected; the engine's default prefixes apply.
    EngineDefault,
}

/// The per-call negotiation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixNegotiation {
    /// Every probe made, in order.
    pub attempts: Vec<PropertyAttempt>,
    /// The final outcome.
    pub outcome: MapperOutcome,
}

impl PrefixNegotiation {
    /// Whether a mapper ended up installed.
    pub fn installed(&self) -> bool {
        matches!(self.outcome, MapperOutcome::Installed(_))
    }
}

/// Probes which prefix-mapper property spelling the active engine
/// accepts and installs the caller's strategy accordingly.
pub struct PrefixMapperNegotiator<'a> {
    part: &'a PartName,
}

impl<'a> PrefixMapperNegotiator<'a> {
    /// Creates a negotiator logging against the given part identity.
    pub fn new(part: &'a PartName) -> Self {
        Self { part }
    }

    /// Runs the ordered fallback chain: the standards-track spelling
    /// first, then the vendor-internal spelling with the strategy adapted
    /// into the variant-appropriate legacy wrapper.
    ///
    /// An unsupported-property rejection moves to the next candidate; any
    /// other property fault is a hard error. Exhausting the chain is a
    /// success with [`MapperOutcome::EngineDefault`]; it never aborts
    /// the caller's marshal.
    pub fn resolve(
        &self,
        strategy: &PrefixMappingStrategy,
        marshaller: &mut dyn Marshaller,
    ) -> Result<PrefixNegotiation, PropertyError> {
        let mut attempts = Vec::new();
        for (name, value) in candidates(strategy) {
            match marshaller.set_property(name, value) {
                Ok(()) => {
                    tracing::debug!(
                        part = %self.part,
                        property = name,
                        strategy = strategy.kind(),
                        "installed prefix mapper"
                    );
                    attempts.push(PropertyAttempt {
                        property: name,
                        accepted: true,
                    });
                    return Ok(PrefixNegotiation {
                        attempts,
                        outcome: MapperOutcome::Installed(name),
                    });
                }
                Err(err) if err.is_unsupported() => {
                    tracing::debug!(
                        part = %self.part,
                        property = name,
                        "prefix mapper property rejected: {err}"
                    );
                    attempts.push(PropertyAttempt {
                        property: name,
                        accepted: false,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        tracing::warn!(
            part = %self.part,
            strategy = strategy.kind(),
            "no prefix mapper installed; engine default prefixes apply"
        );
        Ok(PrefixNegotiation {
            attempts,
            outcome: MapperOutcome::EngineDefault,
        })
    }
}

/// The ordered candidate list for a strategy, each paired with the value
/// shape its property spelling requires.
fn candidates(strategy: &PrefixMappingStrategy) -> Vec<(&'static str, PropertyValue)> {
    match strategy {
        PrefixMappingStrategy::EngineDefault => {
            let mapper: Arc<dyn PrefixMapper> = Arc::new(DefaultPrefixMapper::new());
            vec![
                (
                    property::PREFIX_MAPPER,
                    PropertyValue::PrefixMapper(Arc::clone(&mapper)),
                ),
                (
                    property::PREFIX_MAPPER_INTERNAL,
                    PropertyValue::LegacyPrefixMapper(Arc::new(LegacyMapperAdapter::new(mapper))),
                ),
            ]
        }
        PrefixMappingStrategy::Generic(mapper) => vec![
            (
                property::PREFIX_MAPPER,
                PropertyValue::PrefixMapper(Arc::clone(mapper)),
            ),
            (
                property::PREFIX_MAPPER_INTERNAL,
                PropertyValue::LegacyPrefixMapper(Arc::new(LegacyMapperAdapter::new(Arc::clone(
                    mapper,
                )))),
            ),
        ],
        PrefixMappingStrategy::RelationshipAware(mapper) => vec![
            (
                property::PREFIX_MAPPER,
                PropertyValue::PrefixMapper(Arc::clone(mapper)),
            ),
            (
                property::PREFIX_MAPPER_INTERNAL,
                PropertyValue::LegacyPrefixMapper(Arc::new(LegacyRelationshipAdapter::new(
                    Arc::clone(mapper),
                ))),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carton_xml::{ContentTree, EngineError, XmlNode};
    use std::io::Write;

    struct StubMarshaller {
        accepts: &'static [&'static str],
        installed: Vec<(String, &'static str)>,
    }

    impl StubMarshaller {
        fn accepting(accepts: &'static [&'static str]) -> Self {
            Self {
                accepts,
                installed: Vec::new(),
            }
        }
    }

    impl Marshaller for StubMarshaller {
        fn set_property(
            &mut self,
            name: &str,
            value: PropertyValue,
        ) -> Result<(), PropertyError> {
            if self.accepts.contains(&name) {
                self.installed.push((name.to_string(), value.kind()));
                Ok(())
            } else {
                Err(PropertyError::Unsupported {
                    name: name.to_string(),
                })
            }
        }

        fn marshal(
            &mut self,
            _tree: &ContentTree,
            _out: &mut dyn Write,
        ) -> Result<(), EngineError> {
            Ok(())
        }

        fn marshal_to_node(
            &mut self,
            _tree: &ContentTree,
            _target: &mut XmlNode,
        ) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn part() -> PartName {
        PartName::new("/word/document.xml").expect("valid name")
    }

    #[test]
    fn test_primary_spelling_wins_when_accepted() {
        let part = part();
        let mut marshaller = StubMarshaller::accepting(&[property::PREFIX_MAPPER]);
        let negotiation = PrefixMapperNegotiator::new(&part)
            .resolve(&PrefixMappingStrategy::EngineDefault, &mut marshaller)
            .expect("negotiates");
        assert_eq!(
            negotiation.outcome,
            MapperOutcome::Installed(property::PREFIX_MAPPER)
        );
        assert_eq!(negotiation.attempts.len(), 1);
        assert_eq!(marshaller.installed[0].1, "prefix mapper");
    }

    #[test]
    fn test_falls_back_to_internal_spelling_with_legacy_wrapper() {
        let part = part();
        let mut marshaller = StubMarshaller::accepting(&[property::PREFIX_MAPPER_INTERNAL]);
        let negotiation = PrefixMapperNegotiator::new(&part)
            .resolve(&PrefixMappingStrategy::EngineDefault, &mut marshaller)
            .expect("negotiates");
        assert_eq!(
            negotiation.outcome,
            MapperOutcome::Installed(property::PREFIX_MAPPER_INTERNAL)
        );
        assert_eq!(negotiation.attempts.len(), 2);
        assert!(!negotiation.attempts[0].accepted);
        assert!(negotiation.attempts[1].accepted);
        assert_eq!(marshaller.installed[0].1, "legacy prefix mapper");
    }

    #[test]
    fn test_rejecting_both_spellings_is_not_an_error() {
        let part = part();
        let mut marshaller = StubMarshaller::accepting(&[]);
        let negotiation = PrefixMapperNegotiator::new(&part)
            .resolve(&PrefixMappingStrategy::EngineDefault, &mut marshaller)
            .expect("negotiates");
        assert_eq!(negotiation.outcome, MapperOutcome::EngineDefault);
        assert!(!negotiation.installed());
        assert_eq!(negotiation.attempts.len(), 2);
    }

    #[test]
    fn test_invalid_value_is_a_hard_error() {
        struct Hostile;
        impl Marshaller for Hostile {
            fn set_property(
                &mut self,
                name: &str,
                _value: PropertyValue,
            ) -> Result<(), PropertyError> {
                Err(PropertyError::Invalid {
                    name: name.to_string(),
                    reason: "engine fault".to_string(),
                })
            }
            fn marshal(
                &mut self,
                _tree: &ContentTree,
                _out: &mut dyn Write,
            ) -> Result<(), EngineError> {
                Ok(())
            }
            fn marshal_to_node(
                &mut self,
                _tree: &ContentTree,
                _target: &mut XmlNode,
            ) -> Result<(), EngineError> {
                Ok(())
            }
        }
        let part = part();
        let err = PrefixMapperNegotiator::new(&part)
            .resolve(&PrefixMappingStrategy::EngineDefault, &mut Hostile)
            .unwrap_err();
        assert!(!err.is_unsupported());
    }

    #[test]
    fn test_relationship_strategy_adapts_into_relationship_wrapper() {
        let part = part();
        let mut marshaller = StubMarshaller::accepting(&[property::PREFIX_MAPPER_INTERNAL]);
        let strategy = PrefixMappingStrategy::RelationshipAware(Arc::new(
            crate::prefix::RelationshipPrefixMapper::new(),
        ));
        let negotiation = PrefixMapperNegotiator::new(&part)
            .resolve(&strategy, &mut marshaller)
            .expect("negotiates");
        assert!(negotiation.installed());
        assert_eq!(marshaller.installed[0].1, "legacy prefix mapper");
    }
}
