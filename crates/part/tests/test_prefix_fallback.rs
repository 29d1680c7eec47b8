//! Negotiation against engines with different capability surfaces.
//!
//! The stub engines delegate real serialization to the default engine
//! and differ only in which prefix-mapper property spelling they accept,
//! which is exactly the variation the negotiator exists to absorb.

use std::io::Write;
use std::sync::Arc;

use carton_part::{PartName, PrefixMappingStrategy, XmlPartCodec};
use carton_xml::{
    BindingContext, BindingEngine, ContentModel, ContentTree, Element, ElementDecl, EngineError,
    LegacyPrefixMapper, Marshaller, PrefixMapper, PropertyError, PropertyValue, QName,
    QuickXmlEngine, SchemaSet, Unmarshaller, XmlNode, property,
};

/// Maps `urn:test` to `t`.
struct TestMapper;

impl PrefixMapper for TestMapper {
    fn preferred_prefix(
        &self,
        namespace_uri: &str,
        _suggestion: Option<&str>,
        _require_prefix: bool,
    ) -> Option<String> {
        (namespace_uri == "urn:test").then(|| "t".to_string())
    }
}

/// Presents a legacy mapper through the standard mapper seam so the
/// inner engine can consume it.
struct LegacyBacked(Arc<dyn LegacyPrefixMapper>);

impl PrefixMapper for LegacyBacked {
    fn preferred_prefix(
        &self,
        namespace_uri: &str,
        suggestion: Option<&str>,
        require_prefix: bool,
    ) -> Option<String> {
        let prefix =
            self.0
                .namespace_prefix(namespace_uri, suggestion.unwrap_or(""), require_prefix);
        if prefix.is_empty() && require_prefix {
            None
        } else {
            Some(prefix)
        }
    }
}

/// A marshaller that only understands the vendor-internal spelling.
struct LegacyOnlyMarshaller {
    inner: Box<dyn Marshaller>,
}

impl Marshaller for LegacyOnlyMarshaller {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        match (name, value) {
            (property::PREFIX_MAPPER_INTERNAL, PropertyValue::LegacyPrefixMapper(mapper)) => self
                .inner
                .set_property(
                    property::PREFIX_MAPPER,
                    PropertyValue::PrefixMapper(Arc::new(LegacyBacked(mapper))),
                ),
            (property::PREFIX_MAPPER_INTERNAL, other) => Err(PropertyError::Invalid {
                name: name.to_string(),
                reason: format!("expected a legacy prefix mapper, got a {}", other.kind()),
            }),
            (other, _) => Err(PropertyError::Unsupported {
                name: other.to_string(),
            }),
        }
    }

    fn marshal(&mut self, tree: &ContentTree, out: &mut dyn Write) -> Result<(), EngineError> {
        self.inner.marshal(tree, out)
    }

    fn marshal_to_node(
        &mut self,
        tree: &ContentTree,
        target: &mut XmlNode,
    ) -> Result<(), EngineError> {
        self.inner.marshal_to_node(tree, target)
    }
}

/// An engine whose marshallers only accept the vendor-internal spelling.
struct LegacyOnlyEngine {
    inner: QuickXmlEngine,
}

impl BindingEngine for LegacyOnlyEngine {
    fn create_marshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Marshaller>, EngineError> {
        Ok(Box::new(LegacyOnlyMarshaller {
            inner: self.inner.create_marshaller(schema)?,
        }))
    }

    fn create_unmarshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Unmarshaller>, EngineError> {
        self.inner.create_unmarshaller(schema)
    }
}

/// A marshaller with no prefix-mapper hook at all.
struct MapperlessMarshaller {
    inner: Box<dyn Marshaller>,
}

impl Marshaller for MapperlessMarshaller {
    fn set_property(&mut self, name: &str, _value: PropertyValue) -> Result<(), PropertyError> {
        Err(PropertyError::Unsupported {
            name: name.to_string(),
        })
    }

    fn marshal(&mut self, tree: &ContentTree, out: &mut dyn Write) -> Result<(), EngineError> {
        self.inner.marshal(tree, out)
    }

    fn marshal_to_node(
        &mut self,
        tree: &ContentTree,
        target: &mut XmlNode,
    ) -> Result<(), EngineError> {
        self.inner.marshal_to_node(tree, target)
    }
}

/// An engine rejecting every property spelling.
struct MapperlessEngine {
    inner: QuickXmlEngine,
}

impl BindingEngine for MapperlessEngine {
    fn create_marshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Marshaller>, EngineError> {
        Ok(Box::new(MapperlessMarshaller {
            inner: self.inner.create_marshaller(schema)?,
        }))
    }

    fn create_unmarshaller(
        &self,
        schema: Arc<SchemaSet>,
    ) -> Result<Box<dyn Unmarshaller>, EngineError> {
        self.inner.create_unmarshaller(schema)
    }
}

fn test_schema() -> SchemaSet {
    SchemaSet::new().with_element(
        ElementDecl::new(QName::new("urn:test", "note")).with_content(ContentModel::Text),
    )
}

fn codec_over(engine: Arc<dyn BindingEngine>) -> XmlPartCodec {
    let mut codec = XmlPartCodec::new(
        PartName::new("/content/note.xml").expect("valid name"),
        Arc::new(BindingContext::with_engine(test_schema(), engine)),
    );
    codec.set_content_tree(ContentTree::new(
        Element::new(QName::new("urn:test", "note")).with_text("hi"),
    ));
    codec
}

fn strategy() -> PrefixMappingStrategy {
    PrefixMappingStrategy::Generic(Arc::new(TestMapper))
}

#[test]
fn test_primary_path_uses_the_mapped_prefix() {
    let codec = codec_over(Arc::new(QuickXmlEngine::new()));
    let mut out = Vec::new();
    codec
        .marshal_to_stream_with(&mut out, &strategy())
        .expect("marshals");
    let xml = String::from_utf8(out).expect("utf-8");
    assert!(xml.contains("<t:note xmlns:t=\"urn:test\">hi</t:note>"), "{xml}");
}

#[test]
fn test_fallback_path_still_produces_well_formed_output() {
    let codec = codec_over(Arc::new(LegacyOnlyEngine {
        inner: QuickXmlEngine::new(),
    }));
    let mut out = Vec::new();
    codec
        .marshal_to_stream_with(&mut out, &strategy())
        .expect("falls back to the internal spelling");

    // Re-unmarshal to prove the output is well-formed and equivalent,
    // whatever prefixes the fallback path chose.
    let mut reread = XmlPartCodec::new(
        PartName::new("/content/note.xml").expect("valid name"),
        Arc::new(BindingContext::new(test_schema())),
    );
    let tree = reread.unmarshal_from_stream(&out[..]).expect("well-formed");
    assert_eq!(tree.root().name(), &QName::new("urn:test", "note"));
    assert_eq!(tree.root().text(), "hi");
}

#[test]
fn test_mapperless_engine_marshals_with_default_prefixes() {
    let codec = codec_over(Arc::new(MapperlessEngine {
        inner: QuickXmlEngine::new(),
    }));
    let mut out = Vec::new();
    codec
        .marshal_to_stream_with(&mut out, &strategy())
        .expect("negotiation failure never aborts the marshal");
    let xml = String::from_utf8(out).expect("utf-8");
    assert!(xml.contains("<note xmlns=\"urn:test\">hi</note>"), "{xml}");
}

#[test]
fn test_node_marshal_through_fallback_path() {
    let codec = codec_over(Arc::new(LegacyOnlyEngine {
        inner: QuickXmlEngine::new(),
    }));
    let mut target = XmlNode::fragment();
    codec
        .marshal_to_node_with(&mut target, &strategy())
        .expect("marshals");
    let root = target.children()[0].as_element().expect("element child");
    assert_eq!(root.name(), &QName::new("urn:test", "note"));
    assert_eq!(root.prefix(), Some("t"));
}
